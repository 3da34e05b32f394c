//! Activate/initialize/release bracket around emulator work
//!
//! A `Session` exists only after a successful activation. From that point
//! `vspe_release` runs exactly once, when the session is dropped, so every
//! return path of a command (including `?`) releases the core.

use std::fmt;

use tracing::{debug, warn};

use crate::application::{ApplicationError, ApplicationResult, InfraResultExt};
use crate::infrastructure::traits::VspeApi;

pub struct Session<'a> {
    api: &'a dyn VspeApi,
}

impl<'a> Session<'a> {
    /// Activate with `key` and initialize the core.
    ///
    /// Activation failure returns before anything needs releasing.
    /// Initialization failure still releases, because activation succeeded.
    pub fn open(api: &'a dyn VspeApi, key: &str) -> ApplicationResult<Self> {
        let activated = api.activate(key).with_call_context("activate")?;
        if !activated {
            let reason = api.activation_error();
            warn!("activation rejected: {}", reason);
            return Err(ApplicationError::ActivationFailed { reason });
        }

        let session = Self { api };
        if !api.initialize() {
            return Err(ApplicationError::InitializationFailed);
        }
        debug!("session open");
        Ok(session)
    }

    /// The binding, borrowed from the session so it cannot outlive `release`.
    ///
    /// ```compile_fail
    /// use vspectl::application::services::Session;
    /// use vspectl::infrastructure::VspeApi;
    /// use vspectl::util::testing::FakeVspe;
    ///
    /// let fake = FakeVspe::new();
    /// let api = {
    ///     let session = Session::open(&fake, "").unwrap();
    ///     session.api()
    /// };
    /// api.devices_count();
    /// ```
    pub fn api(&self) -> &dyn VspeApi {
        self.api
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        debug!("session release");
        self.api.release();
    }
}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
