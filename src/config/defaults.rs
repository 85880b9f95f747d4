//! Default configuration values

/// Application name used in directory and install paths
pub const APP_NAME: &str = "mixbridge";

/// Default introspection tool command
pub const INTROSPECT_TOOL: &str = "mixbridge-introspect";

/// Default generator tool command
pub const GENERATOR_TOOL: &str = "mixbridge-generate";

/// Separator between the four fields printed by the introspection tool
pub const FIELD_SEPARATOR: char = ';';

/// Separator between items inside one introspection field
pub const ITEM_SEPARATOR: char = '#';

/// Number of fields the introspection tool must print
pub const INTROSPECTION_FIELDS: usize = 4;

/// Suffix of every artifact name
pub const ARTIFACT_SUFFIX: &str = "mix";

/// Subdirectory of the generator source dir holding message sources
pub const MSG_SUBDIR: &str = "msg";

/// Subdirectory of the generator source dir holding service sources
pub const SRV_SUBDIR: &str = "srv";

/// Extensions of generated files treated as compilable sources
pub const SOURCE_EXTENSIONS: &[&str] = &["cpp", "cc", "cxx", "c"];

/// Extensions of generated files treated as headers
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hpp", "hh", "hxx"];

/// Name of the build graph file written after a run
pub const BUILD_GRAPH_FILE: &str = "build-graph.json";

/// Environment variable with extra prefixes searched for prebuilt artifacts
pub const ENV_PREFIX_PATH: &str = "MIXBRIDGE_PREFIX_PATH";
