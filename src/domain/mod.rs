//! Domain Layer
//!
//! This is the core of Cairn - pure deployment rules without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Context bundle, lock metadata, backup manifests, conflict records
//! - `value_objects/` - Platform, component kinds, strategies, severity
//! - `services/` - Differ, Merger, ConflictResolver, SecurityScanner, Optimizer
//! - `policies/` - Context validation and file-name sanitizing
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system directly
//! 2. **Pure Functions** - Services are stateless (or hold explicit state) and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod policies;
pub mod ports;
pub mod services;
pub mod value_objects;
