use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;

use cairn::presentation::output::DeployResultRenderer as _;
use cairn::presentation::{
    create_cli_orchestrator, exit, exit_code, renderer, DeployArgs, OutputFormat,
};
use cairn::DeploymentOptions;

use super::{home_dir, load_config, load_context, print_error, project_dir, state_dir, Globals};

pub fn cmd_deploy(args: &DeployArgs, globals: &Globals, cancel: Arc<AtomicBool>) -> Result<i32> {
    let context = match load_context(&args.context) {
        Ok(context) => context,
        Err(err) => {
            print_error(&err, globals.json);
            return Ok(exit::INVALID);
        }
    };

    let state_dir = state_dir()?;
    let config = load_config(globals.config.as_deref(), &state_dir)?;
    let project = project_dir(&args.project)?;
    let options = apply_flags(
        config.deployment_options(args.platform, project, home_dir()?),
        args,
    );

    let orchestrator = create_cli_orchestrator(
        &config,
        &state_dir,
        options.effective_strategy(),
        args.events,
        cancel,
    );

    let result = match orchestrator.execute(&context, &options) {
        Ok(result) => result,
        Err(err) => {
            print_error(&anyhow::Error::from(err), globals.json);
            return Ok(exit::INVALID);
        }
    };

    let rendered = renderer(OutputFormat::from_flag(globals.json), globals.verbose).render(&result);
    if globals.json {
        println!("{}", rendered);
    } else {
        print!("{}", rendered);
    }

    Ok(exit_code(&result))
}

/// CLI flags over config-seeded options
fn apply_flags(mut options: DeploymentOptions, args: &DeployArgs) -> DeploymentOptions {
    options = options
        .with_include(args.include.clone())
        .with_exclude(args.exclude.clone())
        .with_merge(args.merge)
        .with_dry_run(args.dry_run)
        .with_validate_only(args.validate_only)
        .with_force(args.force)
        .with_create_backup(args.create_backup)
        .with_metrics(args.metrics);

    if let Some(strategy) = args.strategy {
        options = options.with_strategy(strategy);
    }
    if let Some(dir) = &args.backup_dir {
        options = options.with_backup_dir(dir);
    }
    if let Some(keep) = args.keep_backups {
        options = options.with_keep_backups(keep);
    }
    if args.no_continue_on_error {
        options = options.with_continue_on_error(false);
    }
    if let Some(max) = args.max_concurrency {
        options = options.with_max_concurrency(max);
    }
    options
}
