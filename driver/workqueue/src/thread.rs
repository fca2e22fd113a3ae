//! 工作线程后端：RTOS 目标用 axtask，宿主构建/测试用 std
//!
//! 队列逻辑与后端无关，这里只提供两件事：启动工作线程，以及
//! 提交方到工作线程的等待/唤醒标志。唤醒允许丢失（工作线程在
//! 空闲时带超时等待，超时后自行重查 FIFO）。

use core::time::Duration;

#[cfg(feature = "axtask")]
pub(crate) use ax::{spawn_worker, WaitFlag};
#[cfg(all(feature = "std", not(feature = "axtask")))]
pub(crate) use host::{spawn_worker, WaitFlag};

#[cfg(not(any(feature = "axtask", feature = "std")))]
compile_error!("workqueue: enable feature `axtask` (RTOS) or `std` (host)");

#[cfg(feature = "axtask")]
mod ax {
    use super::Duration;

    pub(crate) struct WaitFlag(axtask::WaitQueue);

    impl WaitFlag {
        pub(crate) fn new() -> Self {
            Self(axtask::WaitQueue::new())
        }

        pub(crate) fn notify(&self) {
            self.0.notify_one(false);
        }

        pub(crate) fn wait_timeout(&self, dur: Duration) {
            let _ = self.0.wait_timeout(dur);
        }
    }

    pub(crate) fn spawn_worker(_name: &str, _stack: usize, f: impl FnOnce() + Send + 'static) {
        let _ = axtask::spawn(f);
    }
}

#[cfg(all(feature = "std", not(feature = "axtask")))]
mod host {
    use super::Duration;
    use std::sync::{Condvar, Mutex};

    pub(crate) struct WaitFlag {
        signaled: Mutex<bool>,
        cond: Condvar,
    }

    impl WaitFlag {
        pub(crate) fn new() -> Self {
            Self {
                signaled: Mutex::new(false),
                cond: Condvar::new(),
            }
        }

        pub(crate) fn notify(&self) {
            if let Ok(mut signaled) = self.signaled.lock() {
                *signaled = true;
                self.cond.notify_one();
            }
        }

        pub(crate) fn wait_timeout(&self, dur: Duration) {
            let guard = match self.signaled.lock() {
                Ok(g) => g,
                Err(_) => return,
            };
            if *guard {
                let mut guard = guard;
                *guard = false;
                return;
            }
            if let Ok((mut guard, _)) = self.cond.wait_timeout(guard, dur) {
                *guard = false;
            }
        }
    }

    pub(crate) fn spawn_worker(name: &str, stack: usize, f: impl FnOnce() + Send + 'static) {
        let _ = std::thread::Builder::new()
            .name(name.into())
            .stack_size(stack)
            .spawn(f);
    }
}
