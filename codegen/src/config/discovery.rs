//! Locating the `dotnet` executable when the config does not name one
//!
//! Lookup is a chain of [`Locator`] strategies picked by [`Platform`]. A
//! strategy that finds nothing returns `Ok(None)` and the next one is tried;
//! only a login shell that cannot be identified is a hard error.

use crate::error::ConfigError;
use crate::process::{ProcessInvocation, ProcessRunner};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const DSCL_PREFIX: &str = "UserShell:";
const PASSWD_FILE: &str = "/etc/passwd";

/// Capabilities of the host platform relevant to executable lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `PATH` can be searched directly for `dotnet.exe`
    Windows,
    /// Login shell comes from the directory service (`dscl`)
    MacOs,
    /// Login shell comes from `/etc/passwd`
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unix
        }
    }

    pub fn executable_name(self) -> &'static str {
        match self {
            Platform::Windows => "dotnet.exe",
            Platform::MacOs | Platform::Unix => "dotnet",
        }
    }
}

/// One way of finding the `dotnet` executable
pub trait Locator: Send + Sync {
    fn name(&self) -> &str;

    fn locate(&self) -> Result<Option<PathBuf>, ConfigError>;
}

/// `dotnet` or `dotnet.exe` sitting in a given directory
pub struct WorkingDirLocator {
    dir: PathBuf,
}

impl WorkingDirLocator {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn current() -> Self {
        Self::new(env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

impl Locator for WorkingDirLocator {
    fn name(&self) -> &str {
        "working directory"
    }

    fn locate(&self) -> Result<Option<PathBuf>, ConfigError> {
        Ok(["dotnet", "dotnet.exe"]
            .iter()
            .map(|name| self.dir.join(name))
            .find(|candidate| candidate.is_file())
            .map(|found| std::path::absolute(&found).unwrap_or(found)))
    }
}

/// Searches every entry of a `PATH`-style variable
pub struct PathSearchLocator {
    path_var: Option<OsString>,
    executable: String,
}

impl PathSearchLocator {
    pub fn new(path_var: Option<OsString>, executable: impl Into<String>) -> Self {
        Self {
            path_var,
            executable: executable.into(),
        }
    }

    pub fn from_env(platform: Platform) -> Self {
        Self::new(env::var_os("PATH"), platform.executable_name())
    }
}

impl Locator for PathSearchLocator {
    fn name(&self) -> &str {
        "PATH"
    }

    fn locate(&self) -> Result<Option<PathBuf>, ConfigError> {
        let Some(path_var) = &self.path_var else {
            return Ok(None);
        };

        Ok(env::split_paths(path_var)
            .map(|dir| dir.join(&self.executable))
            .find(|candidate| candidate.is_file()))
    }
}

/// Where the current user's login shell is recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellSource {
    /// macOS directory service: `dscl . -read <home> UserShell`
    Dscl { home: Option<PathBuf> },
    /// Seventh field of the user's line in a passwd file
    Passwd {
        passwd_file: PathBuf,
        user: Option<String>,
    },
    /// Shell already known to the caller
    Fixed(PathBuf),
}

impl ShellSource {
    pub fn for_current_user(platform: Platform) -> Self {
        match platform {
            Platform::MacOs => ShellSource::Dscl {
                home: dirs::home_dir(),
            },
            Platform::Unix | Platform::Windows => ShellSource::Passwd {
                passwd_file: PathBuf::from(PASSWD_FILE),
                user: current_user(),
            },
        }
    }

    /// Resolve the login shell path
    pub fn login_shell(&self, runner: &dyn ProcessRunner) -> Result<PathBuf, ConfigError> {
        match self {
            ShellSource::Fixed(shell) => Ok(shell.clone()),
            ShellSource::Dscl { home } => {
                let home = home.as_ref().ok_or_else(|| {
                    ConfigError::ShellDiscovery("home directory of the current user is unknown".into())
                })?;
                let invocation = ProcessInvocation::new("dscl")
                    .arg(".")
                    .arg("-read")
                    .arg(home.display().to_string())
                    .arg("UserShell");
                let output = runner
                    .run(&invocation)
                    .map_err(|e| ConfigError::ShellDiscovery(e.to_string()))?;
                parse_dscl_shell(&output.stdout)
            }
            ShellSource::Passwd { passwd_file, user } => {
                let user = user.as_deref().ok_or_else(|| {
                    ConfigError::ShellDiscovery("current user name is unknown".into())
                })?;
                let content = fs::read_to_string(passwd_file).map_err(|e| {
                    ConfigError::ShellDiscovery(format!(
                        "failed to read {}: {}",
                        passwd_file.display(),
                        e
                    ))
                })?;
                parse_passwd_shell(&content, user)
            }
        }
    }
}

fn current_user() -> Option<String> {
    env::var("USER")
        .or_else(|_| env::var("LOGNAME"))
        .ok()
        .filter(|u| !u.is_empty())
}

fn parse_dscl_shell(output: &str) -> Result<PathBuf, ConfigError> {
    let shell = output.strip_prefix(DSCL_PREFIX).ok_or_else(|| {
        ConfigError::ShellDiscovery("`dscl` did not report a UserShell".into())
    })?;
    let shell = shell.trim();
    if shell.is_empty() {
        return Err(ConfigError::ShellDiscovery("`dscl` reported an empty UserShell".into()));
    }
    Ok(PathBuf::from(shell))
}

fn parse_passwd_shell(content: &str, user: &str) -> Result<PathBuf, ConfigError> {
    let prefix = format!("{user}:");
    let entry = content
        .lines()
        .find(|line| line.starts_with(&prefix))
        .ok_or_else(|| {
            ConfigError::ShellDiscovery(format!("no entry for `{user}` in the passwd file"))
        })?;
    let shell = entry.split(':').nth(6).ok_or_else(|| {
        ConfigError::ShellDiscovery(format!("passwd entry for `{user}` has no shell field"))
    })?;
    if shell.is_empty() {
        return Err(ConfigError::ShellDiscovery(format!(
            "passwd entry for `{user}` has an empty shell"
        )));
    }
    Ok(PathBuf::from(shell))
}

/// Pull the `dotnet` path out of `command -v` output from an interactive
/// login shell, which may be preceded by noise from rc files.
fn parse_command_output(stdout: &str) -> Option<PathBuf> {
    let line = stdout.trim().lines().last()?;
    let chunk = line.rsplit(';').next()?;
    let start = chunk.find('/')?;
    let path = chunk[start..].trim();
    (path != "/").then(|| PathBuf::from(path))
}

/// Asks the user's login shell where `dotnet` is
pub struct LoginShellLocator {
    source: ShellSource,
    runner: Arc<dyn ProcessRunner>,
}

impl LoginShellLocator {
    pub fn new(source: ShellSource, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { source, runner }
    }
}

impl Locator for LoginShellLocator {
    fn name(&self) -> &str {
        "login shell"
    }

    fn locate(&self) -> Result<Option<PathBuf>, ConfigError> {
        let shell = self.source.login_shell(self.runner.as_ref())?;
        let invocation = ProcessInvocation::new(&shell).args(["--login", "-i", "-c", "command -v dotnet"]);

        let output = match self.runner.run(&invocation) {
            Ok(output) if output.success() => output,
            Ok(output) => {
                debug!("`{}` exited with {:?}", invocation, output.exit_code);
                return Ok(None);
            }
            Err(e) => {
                debug!("Login shell query failed: {}", e);
                return Ok(None);
            }
        };

        Ok(parse_command_output(&output.stdout).filter(|p| p.is_file()))
    }
}

/// Ordered chain of locators; the first hit wins
#[derive(Default)]
pub struct Discovery {
    locators: Vec<Box<dyn Locator>>,
}

impl Discovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locator<L: Locator + 'static>(mut self, locator: L) -> Self {
        self.locators.push(Box::new(locator));
        self
    }

    /// The standard chain for `platform`
    pub fn for_platform(platform: Platform, runner: Arc<dyn ProcessRunner>) -> Self {
        let discovery = Self::new().with_locator(WorkingDirLocator::current());
        match platform {
            Platform::Windows => discovery.with_locator(PathSearchLocator::from_env(platform)),
            Platform::MacOs | Platform::Unix => discovery.with_locator(LoginShellLocator::new(
                ShellSource::for_current_user(platform),
                runner,
            )),
        }
    }

    pub fn locate(&self) -> Result<Option<PathBuf>, ConfigError> {
        for locator in &self.locators {
            if let Some(found) = locator.locate()? {
                info!("Found dotnet via {}: {}", locator.name(), found.display());
                return Ok(Some(found));
            }
            debug!("dotnet not found via {}", locator.name());
        }
        Ok(None)
    }
}
