use std::{thread, time::Duration};

use tracing::warn;

use crate::{
    models::state::{Identity, PageOptions, PageResult, StateFileRef, Workspace},
    remote::iface::RemoteService,
    utils::errors::StateResult,
};

/// Bounded retry with exponential backoff, applied to transient failures only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn run<T, F>(&self, what: &str, mut op: F) -> StateResult<T>
    where
        F: FnMut() -> StateResult<T>,
    {
        let mut attempt = 0;
        loop {
            match op() {
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let delay = retry_delay(attempt, self.base_delay);
                    warn!(
                        "{what} failed ({err}), retrying in {:?} ({}/{})",
                        delay,
                        attempt + 1,
                        self.max_retries
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                res => return res,
            }
        }
    }
}

/// Delay before retry number `retry_count` (0-indexed): `base * 2^retry_count`.
pub fn retry_delay(retry_count: u32, base: Duration) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(retry_count))
}

/// Wraps a [`RemoteService`] so every call goes through a [`RetryPolicy`].
pub struct RetryingRemoteService<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: RemoteService> RetryingRemoteService<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<S: RemoteService> RemoteService for RetryingRemoteService<S> {
    fn list_workspaces(&self, org: &str, page: PageOptions) -> StateResult<PageResult<Workspace>> {
        self.policy.run("Listing workspaces", || {
            self.inner.list_workspaces(org, page)
        })
    }

    fn list_state_versions(
        &self,
        org: &str,
        workspace: &str,
        page: PageOptions,
    ) -> StateResult<PageResult<StateFileRef>> {
        self.policy.run("Listing state versions", || {
            self.inner.list_state_versions(org, workspace, page)
        })
    }

    fn current_state_version(&self, workspace: &Workspace) -> StateResult<Option<StateFileRef>> {
        self.policy.run("Reading current state version", || {
            self.inner.current_state_version(workspace)
        })
    }

    fn read_current_user(&self) -> StateResult<Identity> {
        self.policy
            .run("Reading current user", || self.inner.read_current_user())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::utils::errors::{RemoteErrorKind, StateInfoError};

    fn fast(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::ZERO)
    }

    #[test]
    fn delay_doubles_per_retry() {
        let base = Duration::from_millis(100);
        assert_eq!(retry_delay(0, base), Duration::from_millis(100));
        assert_eq!(retry_delay(1, base), Duration::from_millis(200));
        assert_eq!(retry_delay(3, base), Duration::from_millis(800));
        assert!(retry_delay(40, Duration::from_secs(u64::MAX / 2)) > Duration::ZERO);
    }

    #[test]
    fn default_policy_makes_a_single_attempt() {
        let calls = Cell::new(0);
        let res: StateResult<()> = RetryPolicy::default().run("op", || {
            calls.set(calls.get() + 1);
            Err(StateInfoError::remote(RemoteErrorKind::Transient, "503"))
        });
        assert!(res.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn transient_failures_are_retried_until_success() {
        let calls = Cell::new(0);
        let res = fast(3).run("op", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(StateInfoError::remote(RemoteErrorKind::Transient, "502"))
            } else {
                Ok(calls.get())
            }
        });
        assert_eq!(res.unwrap(), 3);
    }

    #[test]
    fn retries_are_bounded() {
        let calls = Cell::new(0);
        let res: StateResult<()> = fast(2).run("op", || {
            calls.set(calls.get() + 1);
            Err(StateInfoError::remote(RemoteErrorKind::Transient, "timeout"))
        });
        assert!(res.is_err());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn auth_and_not_found_are_never_retried() {
        for kind in [RemoteErrorKind::Unauthorized, RemoteErrorKind::NotFound] {
            let calls = Cell::new(0);
            let res: StateResult<()> = fast(5).run("op", || {
                calls.set(calls.get() + 1);
                Err(StateInfoError::remote(kind, "nope"))
            });
            assert!(res.is_err());
            assert_eq!(calls.get(), 1);
        }
    }
}
