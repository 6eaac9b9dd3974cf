mod collision;
mod config;
mod error;
mod extract;
mod matcher;
mod metadata;
mod mover;
mod pipeline;
mod resolver;
mod rules;
mod sanitize;
mod template;
mod watch;

pub use collision::resolve_collision;
pub use config::{app_paths, load_config, save_config, AppConfig, AppPaths};
pub use error::{ProcessError, RuleError};
pub use extract::extract_text;
pub use matcher::match_rule;
pub use metadata::{extract_metadata, ExtractedMetadata};
pub use mover::move_file;
pub use pipeline::{
    process_file, process_file_with, scan_folder, scan_folder_with, FileOutcome, ScanOptions,
    ScanReport, ScanStats, SkipReason, DEFAULT_MAX_FILE_SIZE,
};
pub use resolver::{resolve_target, ResolvedTarget};
pub use rules::{load_rules, sample_rules, write_sample_rules, Rule, RuleActions, RuleConditions};
pub use sanitize::sanitize_filename;
pub use template::{parse_template, render_template, TemplateContext, TemplatePart, Token};
pub use watch::{watch_folder, DEFAULT_POLL_INTERVAL};
