//! nestsdk code generator library.
//!
//! This crate turns an OpenAPI/Swagger JSON document (as loaded by
//! `nestsdk-define`) into a single TypeScript client module. The generated
//! code includes:
//!
//! - Shared request types and a default `fetch`-based transport
//! - A `Request` base class owning origin, transport and path substitution
//! - An exported client class with one read-only method group per controller
//! - Imports of the value-object types and validators the methods reference
//!
//! ## Pipeline
//!
//! 1. [`classifier`] groups operations into controllers by `operationId`
//! 2. [`synthesizer`] derives one method per operation, recording model
//!    imports in a [`resolver::DependencySet`]
//! 3. [`output`] assembles the [`ir::GeneratedUnit`], renders it through a
//!    [`render::Renderer`], validates and writes it atomically
//!
//! Anything that degrades the output is reported as a
//! [`diagnostics::Diagnostic`] instead of failing the run.
//!
//! ## Modules
//!
//! - [`classifier`] - Operation to controller/method mapping
//! - [`config`] - Generator configuration (TOML)
//! - [`diagnostics`] - Non-fatal findings of a run
//! - [`errors`] - Error types for the generator
//! - [`ir`] - Declarations of the generated file
//! - [`output`] - Final assembly, validation, and file writing
//! - [`parser`] - Path template utilities
//! - [`render`] - IR to source text
//! - [`resolver`] - `$ref` resolution and import bookkeeping
//! - [`scaffold`] - The request-dispatch scaffold shared by every client
//! - [`synthesizer`] - Per-operation method synthesis
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use nestsdk_gen::config::GeneratorConfig;
//! use nestsdk_gen::output::generate_and_write;
//!
//! let config = GeneratorConfig::default();
//! let generation = generate_and_write(
//!     Path::new("swagger.json"),
//!     Path::new("sdk.ts"),
//!     &config,
//!     false,
//! )
//! .unwrap();
//! println!("{} methods", generation.method_count);
//! ```
//!
//! ## Generated Code Structure
//!
//! For `GET /applications` (`application_findAll`) and `POST /application`
//! (`application_create`, body `ApplicationDtoCreate`, response
//! `ApplicationDto`):
//!
//! ```text
//! import { ApplicationDto } from './zod';
//! import { ApplicationDtoCreate, ApplicationZodCreate } from './zodExt/Application';
//!
//! export class NestSDK extends Request {
//!   private _application = {
//!     findAll: () => { ... },
//!     create: (data: ApplicationDtoCreate, validate: boolean = false) => { ... },
//!   };
//!
//!   readonly application: Readonly<typeof this._application> = this._application;
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod ir;
pub mod output;
pub mod parser;
pub mod render;
pub mod resolver;
pub mod scaffold;
pub mod synthesizer;
