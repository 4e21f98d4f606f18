//! Running the server's data generator.

use crate::errors::CliError;
use camino::Utf8Path;
use std::process::{Command, Stdio};

const MAIN_CLASS: &str = "net.minecraft.data.Main";
const SERVER_JAR: &str = "server.jar";

/// Java argument lists to try, preferred launch mode first.
///
/// Bundler jars need `-DbundlerMainClass`; older jars put the generator on the
/// classpath directly.
pub fn launch_args(uses_bundler: bool) -> [Vec<String>; 2] {
    let bundler = vec![
        format!("-DbundlerMainClass={MAIN_CLASS}"),
        "-jar".to_string(),
        SERVER_JAR.to_string(),
        "--all".to_string(),
    ];
    let classpath = vec![
        "-cp".to_string(),
        SERVER_JAR.to_string(),
        MAIN_CLASS.to_string(),
        "--all".to_string(),
    ];
    if uses_bundler {
        [bundler, classpath]
    } else {
        [classpath, bundler]
    }
}

/// Run the generator in `work_dir`, where `server.jar` lives. Output lands in
/// `work_dir/generated`.
pub fn run_generator(java: &str, work_dir: &Utf8Path, uses_bundler: bool) -> Result<(), CliError> {
    for args in launch_args(uses_bundler) {
        tracing::info!("Running {} {}", java, args.join(" "));
        let status = Command::new(java)
            .args(&args)
            .current_dir(work_dir.as_std_path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() && work_dir.join("generated").is_dir() => return Ok(()),
            Ok(status) => tracing::warn!("Generator exited with {}", status),
            Err(err) => tracing::warn!("Could not start {}: {}", java, err),
        }
    }
    Err(CliError::generator_failed(java))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundler_first_for_bundler_jars() {
        let [first, second] = launch_args(true);
        assert_eq!(first.join(" "), "-DbundlerMainClass=net.minecraft.data.Main -jar server.jar --all");
        assert_eq!(second.join(" "), "-cp server.jar net.minecraft.data.Main --all");
    }

    #[test]
    fn test_classpath_first_for_old_jars() {
        let [first, _] = launch_args(false);
        assert_eq!(first[0], "-cp");
    }

    #[test]
    fn test_missing_runtime_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let work_dir = Utf8Path::from_path(dir.path()).unwrap();
        let err = run_generator("definitely-not-a-java-binary", work_dir, true).unwrap_err();
        assert!(matches!(err, CliError::GeneratorFailed { .. }));
    }
}
