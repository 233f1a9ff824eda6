// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::build_env::{BuildEnv, BuildValue};
use super::command::CommandPlatform;
use super::msvc::{Detection, MsvcOptions, MsvcPatcher, SkipReason, ToolchainProbe};
use super::{HostPlatform, PlatformModule, PlatformOptions, USE_MINGW};
use crate::core::env::container::Env;
use crate::core::env::types::Arch;
use crate::core::env::vcvars::vcvarsall_path;
use crate::core::vs::{VsQuery, vswhere_path};
use crate::error::{DetectError, Result};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Test doubles
// =============================================================================

#[derive(Default)]
struct FakeProbe {
    files: BTreeSet<PathBuf>,
    installation: Option<std::result::Result<String, String>>,
    vcvars: Option<std::result::Result<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeProbe {
    fn with_file(mut self, path: PathBuf) -> Self {
        self.files.insert(path);
        self
    }

    fn installation(mut self, result: std::result::Result<&str, &str>) -> Self {
        self.installation = Some(result.map(String::from).map_err(String::from));
        self
    }

    fn vcvars(mut self, result: std::result::Result<&str, &str>) -> Self {
        self.vcvars = Some(result.map(String::from).map_err(String::from));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ToolchainProbe for FakeProbe {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    async fn installation_path(&self, vswhere: &Path, query: &VsQuery) -> Result<String> {
        self.calls.lock().unwrap().push(format!(
            "vswhere {} {} {}",
            vswhere.display(),
            query.products,
            query.requires
        ));
        match self.installation.clone() {
            Some(Ok(path)) => Ok(path),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => panic!("vswhere should not be called"),
        }
    }

    async fn vcvars_output(
        &self,
        vcvarsall: &Path,
        arch: Arch,
        _timeout: Option<Duration>,
    ) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("vcvarsall {} {arch}", vcvarsall.display()));
        match self.vcvars.clone() {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => panic!("vcvarsall should not be called"),
        }
    }
}

/// Records the environment it was generated with.
#[derive(Default)]
struct RecordingPlatform {
    seen: Mutex<Option<BuildEnv>>,
    fail: bool,
}

impl RecordingPlatform {
    fn seen(&self) -> Option<BuildEnv> {
        self.seen.lock().unwrap().clone()
    }
}

impl PlatformModule for RecordingPlatform {
    fn name(&self) -> &str {
        "recording"
    }

    fn options(&self, opts: &mut PlatformOptions) {
        opts.add("target", "Build target", "template_debug");
        opts.add(USE_MINGW, "Use MinGW", false);
    }

    fn exists(&self, env: &BuildEnv) -> bool {
        env.process().get("RECORDING_OK").is_some()
    }

    async fn generate(&self, env: &mut BuildEnv) -> Result<()> {
        *self.seen.lock().unwrap() = Some(env.clone());
        if self.fail {
            anyhow::bail!("inner generate failed");
        }
        Ok(())
    }
}

fn windows_env() -> BuildEnv {
    let mut process = Env::new();
    process.set("ProgramFiles(x86)", r"C:\PF");
    process.set("PATH", r"C:\Windows");
    BuildEnv::with_process(process)
}

fn locator(env: &BuildEnv) -> PathBuf {
    vswhere_path(env.process())
}

fn patcher(probe: FakeProbe, host: HostPlatform) -> MsvcPatcher<RecordingPlatform, FakeProbe> {
    MsvcPatcher::with_probe(
        RecordingPlatform::default(),
        probe,
        host,
        MsvcOptions::default(),
    )
}

#[derive(Clone, Default)]
struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CaptureWriter {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

// =============================================================================
// BuildEnv
// =============================================================================

#[test]
fn test_build_env_inject_sets_both_views() {
    let mut env = BuildEnv::new();
    env.inject("INCLUDE", r"C:\inc");

    assert_eq!(env.get_str("INCLUDE"), Some(r"C:\inc"));
    assert_eq!(env.process().get("include"), Some(r"C:\inc"));
}

#[test]
fn test_build_env_set_overrides_previous_value() {
    let mut env = BuildEnv::new();
    env.set(USE_MINGW, true);
    env.set(USE_MINGW, false);

    assert_eq!(env.get_bool(USE_MINGW), Some(false));
    assert_eq!(env.get_str(USE_MINGW), None);
}

#[test]
fn test_build_value_display_and_json() {
    assert_eq!(BuildValue::Bool(false).to_string(), "false");
    assert_eq!(BuildValue::from("x64").to_string(), "x64");

    let mut env = BuildEnv::new();
    env.set(USE_MINGW, false).inject("LIB", r"C:\lib");
    let json = serde_json::to_string(env.settings_map()).unwrap();
    insta::assert_snapshot!(json, @r#"{"LIB":"C:\\lib","use_mingw":false}"#);
}

// =============================================================================
// PlatformOptions / HostPlatform
// =============================================================================

#[test]
fn test_platform_options_redeclare_replaces_in_place() {
    let mut opts = PlatformOptions::new();
    opts.add("a", "first", "1").add("b", "second", true);
    opts.add("a", "again", "2");

    let names: Vec<_> = opts.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
    assert_eq!(opts.get("a").unwrap().help, "again");
    assert_eq!(opts.len(), 2);
}

#[test]
fn test_host_platform_names() {
    assert_eq!(HostPlatform::Win32.to_string(), "win32");
    assert!(HostPlatform::Win32.is_win32());
    assert!(!HostPlatform::Linux.is_win32());
    assert_eq!(
        HostPlatform::current().is_win32(),
        cfg!(windows),
        "current() should match the compile target"
    );
}

// =============================================================================
// MsvcPatcher
// =============================================================================

#[tokio::test]
async fn test_patch_full_detection_injects_variables() {
    let env = windows_env();
    let probe = FakeProbe::default()
        .with_file(locator(&env))
        .with_file(vcvarsall_path(Path::new(r"C:\VS")))
        .installation(Ok(r"C:\VS"))
        .vcvars(Ok("INCLUDE=C:\\inc\n PATH=C:\\bin\n"));
    let patcher = patcher(probe, HostPlatform::Win32);

    let mut env = env;
    patcher.generate(&mut env).await.unwrap();

    let seen = patcher.inner().seen().expect("inner module should run");
    assert_eq!(seen.get_str("INCLUDE"), Some(r"C:\inc"));
    assert_eq!(seen.get_str("PATH"), Some(r"C:\bin"));
    assert_eq!(seen.get_bool(USE_MINGW), Some(false));
    assert_eq!(seen.process().get("Path"), Some(r"C:\bin"));
}

#[tokio::test]
async fn test_patch_reports_injected_count() {
    let mut env = windows_env();
    let probe = FakeProbe::default()
        .with_file(locator(&env))
        .with_file(vcvarsall_path(Path::new(r"C:\VS")))
        .installation(Ok(r"C:\VS"))
        .vcvars(Ok("banner line\nA=1\nB=x=y\n"));
    let patcher = patcher(probe, HostPlatform::Win32);

    let detection = patcher.patch(&mut env).await;

    assert!(detection.is_injected());
    insta::assert_snapshot!(
        detection.to_string().replace('\\', "/"),
        @"injected 2 variables from 'C:/VS'"
    );
    assert_eq!(env.get_str("B"), Some("x=y"));
}

#[tokio::test]
async fn test_patch_passes_query_and_arch() {
    let env = windows_env();
    let script = vcvarsall_path(Path::new(r"C:\VS"));
    let probe = FakeProbe::default()
        .with_file(PathBuf::from(r"D:\tools\vswhere.exe"))
        .with_file(script.clone())
        .installation(Ok(r"C:\VS"))
        .vcvars(Ok(""));
    let options = MsvcOptions::builder()
        .vswhere(PathBuf::from(r"D:\tools\vswhere.exe"))
        .arch(Arch::Arm64)
        .query(VsQuery {
            products: "Microsoft.VisualStudio.Product.BuildTools".to_string(),
            ..VsQuery::default()
        })
        .build();
    let patcher = MsvcPatcher::with_probe(
        RecordingPlatform::default(),
        probe,
        HostPlatform::Win32,
        options,
    );

    let mut env = env;
    let detection = patcher.patch(&mut env).await;

    assert!(matches!(detection, Detection::Injected { count: 0, .. }));
    let calls = patcher_calls(&patcher);
    assert_eq!(
        calls,
        [
            r"vswhere D:\tools\vswhere.exe Microsoft.VisualStudio.Product.BuildTools Microsoft.VisualStudio.Component.VC.Tools.x86.x64".to_string(),
            format!("vcvarsall {} arm64", script.display()),
        ]
    );
}

fn patcher_calls(patcher: &MsvcPatcher<RecordingPlatform, FakeProbe>) -> Vec<String> {
    patcher.probe().calls()
}

#[tokio::test]
async fn test_patch_non_windows_skips_and_forces_mingw_off() {
    let mut env = windows_env();
    env.set(USE_MINGW, true);
    let patcher = patcher(FakeProbe::default(), HostPlatform::Linux);

    patcher.generate(&mut env).await.unwrap();

    let seen = patcher.inner().seen().unwrap();
    assert_eq!(seen.get_bool(USE_MINGW), Some(false));
    assert_eq!(seen.settings().count(), 1);
    assert!(patcher_calls(&patcher).is_empty());
}

#[tokio::test]
async fn test_patch_disabled_skips_detection() {
    let mut env = windows_env();
    let probe = FakeProbe::default().with_file(locator(&env));
    let patcher = MsvcPatcher::with_probe(
        RecordingPlatform::default(),
        probe,
        HostPlatform::Win32,
        MsvcOptions::builder().enabled(false).build(),
    );

    let detection = patcher.patch(&mut env).await;

    assert_eq!(detection.skip_reason(), Some(&SkipReason::Disabled));
    assert_eq!(env.get_bool(USE_MINGW), Some(false));
}

#[tokio::test]
async fn test_patch_missing_locator_runs_nothing_and_stays_quiet() {
    let capture = CaptureWriter::default();
    let _guard = capture.install();

    let mut env = windows_env();
    let expected = locator(&env);
    let patcher = patcher(FakeProbe::default(), HostPlatform::Win32);

    let detection = patcher.patch(&mut env).await;

    assert_eq!(
        detection.skip_reason(),
        Some(&SkipReason::LocatorMissing(expected))
    );
    assert!(patcher_calls(&patcher).is_empty());
    assert!(capture.text().is_empty(), "unexpected log: {}", capture.text());
    assert_eq!(env.get_bool(USE_MINGW), Some(false));
}

#[tokio::test]
async fn test_patch_locator_failure_warns_and_continues() {
    let capture = CaptureWriter::default();
    let _guard = capture.install();

    let mut env = windows_env();
    let probe = FakeProbe::default()
        .with_file(locator(&env))
        .installation(Err("process 'vswhere' exited with code 87"));
    let patcher = patcher(probe, HostPlatform::Win32);

    patcher.generate(&mut env).await.unwrap();

    let logged = capture.text();
    assert!(logged.contains("WARN"), "{logged}");
    assert!(logged.contains("Could not auto-setup MSVC"), "{logged}");
    assert!(logged.contains("exited with code 87"), "{logged}");

    let seen = patcher.inner().seen().unwrap();
    assert_eq!(seen.get_bool(USE_MINGW), Some(false));
    assert_eq!(seen.settings().count(), 1);
}

#[tokio::test]
async fn test_patch_locator_failure_is_typed() {
    let mut env = windows_env();
    let probe = FakeProbe::default()
        .with_file(locator(&env))
        .installation(Err("boom"));
    let patcher = patcher(probe, HostPlatform::Win32);

    let detection = patcher.patch(&mut env).await;

    let Detection::Failed(DetectError::LocatorFailed { message, .. }) = detection else {
        panic!("expected locator failure, got {detection:?}");
    };
    assert_eq!(message, "boom");
}

#[tokio::test]
async fn test_patch_empty_installation_path_skips() {
    let mut env = windows_env();
    let probe = FakeProbe::default()
        .with_file(locator(&env))
        .installation(Ok(""));
    let patcher = patcher(probe, HostPlatform::Win32);

    let detection = patcher.patch(&mut env).await;

    assert_eq!(detection.skip_reason(), Some(&SkipReason::NoInstallation));
    assert_eq!(patcher_calls(&patcher).len(), 1);
}

#[tokio::test]
async fn test_patch_missing_vcvarsall_skips() {
    let mut env = windows_env();
    let probe = FakeProbe::default()
        .with_file(locator(&env))
        .installation(Ok(r"C:\VS"));
    let patcher = patcher(probe, HostPlatform::Win32);

    let detection = patcher.patch(&mut env).await;

    assert_eq!(
        detection.skip_reason(),
        Some(&SkipReason::VcvarsallMissing(vcvarsall_path(Path::new(
            r"C:\VS"
        ))))
    );
    assert_eq!(env.settings().count(), 1);
}

#[tokio::test]
async fn test_patch_vcvarsall_failure_is_setup_error() {
    let mut env = windows_env();
    let probe = FakeProbe::default()
        .with_file(locator(&env))
        .with_file(vcvarsall_path(Path::new(r"C:\VS")))
        .installation(Ok(r"C:\VS"))
        .vcvars(Err("process 'vcvarsall' exited with code 1"));
    let patcher = patcher(probe, HostPlatform::Win32);

    let detection = patcher.patch(&mut env).await;

    assert!(matches!(
        detection,
        Detection::Failed(DetectError::SetupFailed { .. })
    ));
    assert_eq!(env.process().get("INCLUDE"), None);
}

#[tokio::test]
async fn test_patch_duplicate_keys_last_wins() {
    let mut env = windows_env();
    let probe = FakeProbe::default()
        .with_file(locator(&env))
        .with_file(vcvarsall_path(Path::new(r"C:\VS")))
        .installation(Ok(r"C:\VS"))
        .vcvars(Ok("LIB=first\nLIB=second\n"));
    let patcher = patcher(probe, HostPlatform::Win32);

    patcher.patch(&mut env).await;

    assert_eq!(env.get_str("LIB"), Some("second"));
    assert_eq!(env.process().get("LIB"), Some("second"));
}

#[tokio::test]
async fn test_patch_inner_error_propagates_after_patching() {
    let mut env = windows_env();
    let patcher = MsvcPatcher::with_probe(
        RecordingPlatform {
            fail: true,
            ..RecordingPlatform::default()
        },
        FakeProbe::default(),
        HostPlatform::Linux,
        MsvcOptions::default(),
    );

    let err = patcher.generate(&mut env).await.unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"inner generate failed");
    assert_eq!(
        patcher.inner().seen().unwrap().get_bool(USE_MINGW),
        Some(false)
    );
}

#[test]
fn test_patcher_forwards_options_and_exists() {
    let patcher = patcher(FakeProbe::default(), HostPlatform::Win32);

    let mut wrapped = PlatformOptions::new();
    patcher.options(&mut wrapped);
    let mut direct = PlatformOptions::new();
    patcher.inner().options(&mut direct);

    assert_eq!(
        wrapped.iter().collect::<Vec<_>>(),
        direct.iter().collect::<Vec<_>>()
    );
    assert_eq!(patcher.name(), "recording");

    let mut env = BuildEnv::new();
    assert!(!patcher.exists(&env));
    env.process_mut().set("RECORDING_OK", "1");
    assert!(patcher.exists(&env));
}

// =============================================================================
// CommandPlatform
// =============================================================================

#[test]
fn test_command_args_forward_present_settings() {
    let platform = CommandPlatform::new("scons")
        .with_args(["platform=windows"])
        .with_forward(["use_mingw", "target"])
        .with_extra_args(vec!["-j8".to_string()]);

    let mut env = BuildEnv::new();
    env.set(USE_MINGW, false);

    assert_eq!(
        platform.command_args(&env),
        ["platform=windows", "use_mingw=false", "-j8"]
    );
}

#[test]
fn test_command_options_declares_forwarded_keys() {
    let platform = CommandPlatform::new("scons").with_forward(["use_mingw", "target"]);
    let mut opts = PlatformOptions::new();
    platform.options(&mut opts);

    assert_eq!(opts.get(USE_MINGW).unwrap().default, BuildValue::Bool(false));
    insta::assert_snapshot!(opts.get("target").unwrap().help, @"Passed to scons as target=<value>");
}

#[test]
fn test_command_exists_uses_build_env_path() {
    let platform = CommandPlatform::new("definitely-not-a-real-build-tool");
    assert!(!platform.exists(&BuildEnv::current()));
}

#[tokio::test]
#[cfg(not(windows))]
async fn test_command_generate_sees_patched_env_and_args() {
    let platform = CommandPlatform::new("sh")
        .with_args(["-c", r#"[ "$0" = use_mingw=false ] && [ "$INCLUDE" = /inc ]"#])
        .with_forward([USE_MINGW]);

    let mut env = BuildEnv::current();
    env.inject("INCLUDE", "/inc");
    env.set(USE_MINGW, false);

    assert!(platform.exists(&env));
    platform.generate(&mut env).await.unwrap();
}

#[tokio::test]
#[cfg(not(windows))]
async fn test_command_generate_reports_exit_code() {
    let platform = CommandPlatform::new("sh").with_args(["-c", "exit 5"]);
    let mut env = BuildEnv::current();

    let err = platform.generate(&mut env).await.unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"process 'sh' exited with code 5");
}

#[tokio::test]
async fn test_command_generate_missing_program() {
    let platform = CommandPlatform::new("definitely-not-a-real-build-tool");
    let mut env = BuildEnv::current();

    let err = platform.generate(&mut env).await.unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"executable not found: 'definitely-not-a-real-build-tool' (not in PATH)"
    );
}

#[tokio::test]
#[cfg(not(windows))]
async fn test_command_generate_cancelled() {
    let token = tokio_util::sync::CancellationToken::new();
    token.cancel();
    let platform = CommandPlatform::new("sh")
        .with_args(["-c", "sleep 5"])
        .with_cancellation(token);
    let mut env = BuildEnv::current();

    let err = platform.generate(&mut env).await.unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"process 'sh' was interrupted");
}
