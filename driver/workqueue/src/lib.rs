//! WLAN 延迟工作队列：单工作线程顺序消费的 FIFO
//!
//! 事件回调可能运行在中断样上下文，不允许阻塞；需要阻塞语义的
//! 处理经本队列转投到专职工作线程执行。提交只做入队与唤醒，可
//! 在任意上下文调用；消费严格按提交顺序、一次一项、即发即忘，
//! 没有优先级、取消与回执。
//!
//! 进程内唯一实例经 wlan_workqueue_init() 建立（幂等，无显式
//! 销毁）；测试可用 WlanWorkqueue::new() 构造独立实例，实例
//! drop 后工作线程清空剩余工作并退出。

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod thread;

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use core::ffi::c_void;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use axerrno::{LinuxError, LinuxResult};

/// 工作函数：参数为提交时登记的私有指针
pub type WlanWorkFn = fn(*mut c_void);

/// 工作线程名
pub const WLAN_WORKQUEUE_THREAD_NAME: &str = "wlan_wq";
/// 工作线程栈大小
pub const WLAN_WORKQUEUE_THREAD_SIZE: usize = 2048;
/// FIFO 深度上限，提交满返回 ENOMEM
pub const WLAN_WORKQUEUE_DEPTH: usize = 32;

/// 空闲时工作线程单次等待唤醒的时长
const IDLE_WAIT_MS: u64 = 10;

/// 单个工作项：从提交到执行完成归队列独占所有
struct WlanWork {
    func: WlanWorkFn,
    parameter: *mut c_void,
}

// parameter 的跨线程有效性由提交方保证
unsafe impl Send for WlanWork {}

struct Inner {
    fifo: spin::Mutex<VecDeque<WlanWork>>,
    closed: AtomicBool,
    trigger: thread::WaitFlag,
}

/// 延迟工作队列实例
pub struct WlanWorkqueue {
    inner: Arc<Inner>,
}

impl WlanWorkqueue {
    /// 创建队列并启动其工作线程
    pub fn new() -> Self {
        let inner = Arc::new(Inner {
            fifo: spin::Mutex::new(VecDeque::with_capacity(WLAN_WORKQUEUE_DEPTH)),
            closed: AtomicBool::new(false),
            trigger: thread::WaitFlag::new(),
        });
        let worker = inner.clone();
        thread::spawn_worker(WLAN_WORKQUEUE_THREAD_NAME, WLAN_WORKQUEUE_THREAD_SIZE, move || {
            worker_loop(&worker)
        });
        Self { inner }
    }

    /// 提交一项延迟工作。队列满返回 ENOMEM，已关闭返回 EPIPE；
    /// 两种失败路径下被拒绝的工作项随返回即释放。
    pub fn dowork(&self, func: WlanWorkFn, parameter: *mut c_void) -> LinuxResult {
        let work = WlanWork { func, parameter };
        if self.inner.closed.load(Ordering::Acquire) {
            log::error!(target: "wlan::work", "dowork: queue closed");
            return Err(LinuxError::EPIPE);
        }
        {
            let mut fifo = self.inner.fifo.lock();
            if fifo.len() >= WLAN_WORKQUEUE_DEPTH {
                log::error!(target: "wlan::work", "dowork: fifo full ({})", WLAN_WORKQUEUE_DEPTH);
                return Err(LinuxError::ENOMEM);
            }
            fifo.push_back(work);
        }
        self.inner.trigger.notify();
        Ok(())
    }
}

impl Default for WlanWorkqueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WlanWorkqueue {
    fn drop(&mut self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.trigger.notify();
    }
}

fn worker_loop(inner: &Inner) {
    log::info!(target: "wlan::work", "workqueue worker start");
    loop {
        let work = inner.fifo.lock().pop_front();
        match work {
            Some(w) => {
                log::trace!(target: "wlan::work", "run work {:p}", w.func);
                (w.func)(w.parameter);
            }
            None => {
                if inner.closed.load(Ordering::Acquire) {
                    break;
                }
                inner.trigger.wait_timeout(Duration::from_millis(IDLE_WAIT_MS));
            }
        }
    }
    log::info!(target: "wlan::work", "workqueue worker exit");
}

/// 进程内唯一队列
static WLAN_WORKQUEUE: spin::Once<WlanWorkqueue> = spin::Once::new();

/// 建立进程内唯一队列并启动工作线程；重复调用幂等成功
pub fn wlan_workqueue_init() -> LinuxResult {
    WLAN_WORKQUEUE.call_once(|| {
        log::info!(target: "wlan::work", "create wlan workqueue (depth {})", WLAN_WORKQUEUE_DEPTH);
        WlanWorkqueue::new()
    });
    Ok(())
}

/// 唯一队列句柄；未初始化时 None
pub fn wlan_workqueue() -> Option<&'static WlanWorkqueue> {
    WLAN_WORKQUEUE.get()
}

/// 向唯一队列提交延迟工作；未初始化返回 ENODEV
pub fn wlan_workqueue_dowork(func: WlanWorkFn, parameter: *mut c_void) -> LinuxResult {
    match WLAN_WORKQUEUE.get() {
        Some(wq) => wq.dowork(func, parameter),
        None => {
            log::error!(target: "wlan::work", "dowork: workqueue not init");
            Err(LinuxError::ENODEV)
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicUsize;
    use std::thread::sleep;

    fn nop(_p: *mut c_void) {}

    fn wait_until(cond: impl Fn() -> bool) -> bool {
        for _ in 0..500 {
            if cond() {
                return true;
            }
            sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn global_queue_lifecycle() {
        static RAN: AtomicUsize = AtomicUsize::new(0);
        fn bump(_p: *mut c_void) {
            RAN.fetch_add(1, Ordering::SeqCst);
        }

        // 初始化之前提交失败
        assert!(wlan_workqueue().is_none());
        assert_eq!(
            wlan_workqueue_dowork(nop, core::ptr::null_mut()),
            Err(LinuxError::ENODEV)
        );

        wlan_workqueue_init().unwrap();
        wlan_workqueue_init().unwrap();
        assert!(wlan_workqueue().is_some());

        wlan_workqueue_dowork(bump, core::ptr::null_mut()).unwrap();
        assert!(wait_until(|| RAN.load(Ordering::SeqCst) == 1));
    }

    #[test]
    fn fifo_order_and_exact_parameter() {
        static ORDER: spin::Mutex<alloc::vec::Vec<usize>> = spin::Mutex::new(alloc::vec::Vec::new());
        fn record(p: *mut c_void) {
            ORDER.lock().push(p as usize);
        }

        let wq = WlanWorkqueue::new();
        for i in 1..=8usize {
            wq.dowork(record, i as *mut c_void).unwrap();
        }
        assert!(wait_until(|| ORDER.lock().len() == 8));
        // 每项恰好执行一次，严格按提交顺序，参数原样传递
        assert_eq!(*ORDER.lock(), alloc::vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn full_fifo_reports_enomem() {
        static BLOCK: AtomicBool = AtomicBool::new(true);
        static STARTED: AtomicBool = AtomicBool::new(false);
        fn blocker(_p: *mut c_void) {
            STARTED.store(true, Ordering::SeqCst);
            while BLOCK.load(Ordering::SeqCst) {
                sleep(Duration::from_millis(1));
            }
        }

        let wq = WlanWorkqueue::new();
        wq.dowork(blocker, core::ptr::null_mut()).unwrap();
        assert!(wait_until(|| STARTED.load(Ordering::SeqCst)));

        for _ in 0..WLAN_WORKQUEUE_DEPTH {
            wq.dowork(nop, core::ptr::null_mut()).unwrap();
        }
        assert_eq!(
            wq.dowork(nop, core::ptr::null_mut()),
            Err(LinuxError::ENOMEM)
        );
        BLOCK.store(false, Ordering::SeqCst);
    }
}
