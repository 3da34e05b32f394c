//! Compiles `tests/fixtures/vspe_fixture.c` into two shared libraries for the
//! native binding tests: a complete one, and one lacking `vspe_release`.
//!
//! Paths reach the tests as `VSPECTL_FIXTURE_LIB` and
//! `VSPECTL_FIXTURE_PARTIAL_LIB`. A missing C compiler only skips the
//! fixture with a warning; the crate itself never links against it.
use std::env;
use std::path::{Path, PathBuf};

const FIXTURE_SOURCE: &str = "tests/fixtures/vspe_fixture.c";

fn main() {
    println!("cargo:rerun-if-changed={FIXTURE_SOURCE}");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR"));
    let source = manifest_dir.join(FIXTURE_SOURCE);

    let complete = out_dir.join(library_file_name("vspe_fixture"));
    let partial = out_dir.join(library_file_name("vspe_fixture_partial"));

    let built = build_shared(&source, &complete, &out_dir, &[]).and_then(|()| {
        build_shared(&source, &partial, &out_dir, &["VSPE_FIXTURE_OMIT_RELEASE"])
    });
    match built {
        Ok(()) => {
            println!("cargo:rustc-env=VSPECTL_FIXTURE_LIB={}", complete.display());
            println!("cargo:rustc-env=VSPECTL_FIXTURE_PARTIAL_LIB={}", partial.display());
        }
        Err(err) => println!("cargo:warning=native test fixture not built: {err}"),
    }
}

fn library_file_name(stem: &str) -> String {
    match env::var("CARGO_CFG_TARGET_OS").as_deref() {
        Ok("windows") => format!("{stem}.dll"),
        Ok("macos") | Ok("ios") => format!("lib{stem}.dylib"),
        _ => format!("lib{stem}.so"),
    }
}

/// `cc` only produces static archives, so take its configured compiler and
/// drive the shared-library link by hand.
fn build_shared(source: &Path, output: &Path, out_dir: &Path, defines: &[&str]) -> Result<(), String> {
    let compiler = cc::Build::new()
        .cargo_metadata(false)
        .try_get_compiler()
        .map_err(|e| e.to_string())?;
    let mut cmd = compiler.to_command();

    if compiler.is_like_msvc() {
        cmd.arg("/nologo").arg("/LD");
        for define in defines {
            cmd.arg(format!("/D{define}"));
        }
        cmd.arg(format!("/Fo{}\\", out_dir.display()))
            .arg(source)
            .arg(format!("/Fe{}", output.display()));
    } else {
        cmd.arg("-shared").arg("-fPIC");
        for define in defines {
            cmd.arg(format!("-D{define}"));
        }
        cmd.arg("-o").arg(output).arg(source);
    }

    let status = cmd
        .status()
        .map_err(|e| format!("{}: {e}", compiler.path().display()))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{} exited with {status}", compiler.path().display()))
    }
}
