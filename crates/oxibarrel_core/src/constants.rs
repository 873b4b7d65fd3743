//! Default extension sets and the merge-marker prefixes recognised by the purger.
//!
//! The defaults mirror what a site using the generated aggregator usually
//! contains: plain JavaScript/JSX modules that carry named exports, and
//! stylesheets that are imported only for their side effects.

/// Extensions routed to named-export extraction by default
pub const DEFAULT_JS_EXTENSIONS: &[&str] = &["js", "jsx"];

/// Extensions routed to side-effect-only imports by default
pub const DEFAULT_OTHER_EXTENSIONS: &[&str] = &["css", "less", "sass", "scss"];

/// Extensions parsed with TypeScript syntax enabled
pub const TYPESCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];

/// Extensions parsed with JSX syntax enabled regardless of parser options
pub const JSX_EXTENSIONS: &[&str] = &["jsx", "tsx"];

pub const DEFAULT_OUTPUT_NAME: &str = "imports.js";

pub const CONFLICT_START: &str = "<<<<<<<";
pub const CONFLICT_SEPARATOR: &str = "=======";
pub const CONFLICT_END: &str = ">>>>>>>";
