//! Fixed paths, names, and timeouts shared by the manifest tooling and the
//! acceptance harness.

use std::time::Duration;

/// Manifest file name at the repository root.
pub const MANIFEST_FILE: &str = "repos.conf";

/// Location of the manifest copy inside the built image.
pub const IMAGE_MANIFEST_PATH: &str = "/etc/vvm/repos.conf";

/// Entrypoint script the image must ship, marked executable.
pub const IMAGE_ENTRYPOINT: &str = "/usr/local/bin/entrypoint.sh";

/// Working directory the image must provide.
pub const IMAGE_WORKDIR: &str = "/workspace";

/// Python version prefix the image must report.
pub const PYTHON_VERSION: &str = "3.11";

/// Tag applied to the image built by the acceptance harness.
pub const DEFAULT_IMAGE_TAG: &str = "vvm:test";

/// Container engine binary invoked by default.
pub const DEFAULT_ENGINE: &str = "docker";

/// Separator between manifest fields.
pub const FIELD_SEPARATOR: char = '|';

/// Prefix marking a manifest comment line (after trimming).
pub const COMMENT_PREFIX: char = '#';

/// Number of fields in a well-formed manifest entry.
pub const MANIFEST_FIELD_COUNT: usize = 4;

/// The only git host accepted in manifest URLs.
pub const ALLOWED_GIT_HOST: &str = "github.com";

/// Timeout for the engine reachability probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the image build.
pub const BUILD_TIMEOUT: Duration = Duration::from_secs(600);

/// Timeout for each checklist command.
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// Lines of build output kept in a build-failure diagnostic.
pub const BUILD_TAIL_LINES: usize = 50;

/// Prefix for the names given to checklist containers.
pub const CONTAINER_NAME_PREFIX: &str = "vvm-check";

/// Application name used in CLI output.
pub const APP_NAME: &str = "vvm";
