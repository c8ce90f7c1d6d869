use std::path::Path;

use anyhow::Result;

use cairn::presentation::{create_orchestrator, exit};
use cairn::Platform;

use super::{load_config, print_error, project_dir, state_dir, Globals};

pub fn cmd_unlock(platform: Platform, project: &Path, globals: &Globals) -> Result<i32> {
    let state_dir = state_dir()?;
    let config = load_config(globals.config.as_deref(), &state_dir)?;
    let project = project_dir(project)?;

    let removed = match create_orchestrator(&config, &state_dir).unlock(platform, &project) {
        Ok(removed) => removed,
        Err(err) => {
            print_error(&anyhow::Error::from(err), globals.json);
            return Ok(exit::LOCK);
        }
    };

    if globals.json {
        let output = serde_json::json!({
            "event": "unlock",
            "platform": platform,
            "project": project,
            "removed": removed,
        });
        println!("{}", output);
    } else if removed {
        println!("✓ Removed {} lock for {}", platform, project.display());
    } else {
        println!("No {} lock held for {}", platform, project.display());
    }

    Ok(exit::SUCCESS)
}
