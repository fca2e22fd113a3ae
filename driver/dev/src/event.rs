//! 每设备事件订阅表
//!
//! 订阅表是 [事件类型][槽位] 的固定二维数组，槽位数编译期固定，
//! 注册不扩容。表的读写在自旋锁内完成（本目标运行时没有全局关
//! 中断原语，以自旋锁作为临界区替代），持锁区间 O(槽位数)，绝不
//! 在持锁时进入 handler 代码。
//!
//! 指示分发采用先快照后调用：持锁把该事件的整行槽位拷贝到局部
//! 数组，释放锁之后再按槽位顺序逐个调用非空回调。handler 内部
//! 因此可以再次 register/unregister 而不会自死锁；与快照同时发生
//! 的注册/注销是否被本次分发观察到不作保证。

use core::ffi::c_void;

use axerrno::{LinuxError, LinuxResult};

use crate::device::WlanDevice;

/// 每种事件的订阅槽位数
pub const WLAN_DEV_EVENT_NUM: usize = 2;

/// 设备异步事件
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WlanDevEvent {
    InitDone = 0,
    Connect,
    ConnectFail,
    Disconnect,
    ApStart,
    ApStop,
    ApAssociated,
    ApDisassociated,
    ApAssociateFailed,
    ScanReport,
    ScanDone,
}

/// 事件类型总数（订阅表行数）
const WLAN_DEV_EVT_MAX: usize = 11;

/// 事件回调：参数依次为设备、事件、指示负载、注册时登记的私有参数。
/// 回调可能运行在中断样上下文，不得阻塞；需要阻塞的处理转投工作队列。
pub type WlanDevEventHandler = fn(&WlanDevice, WlanDevEvent, Option<&[u8]>, *mut c_void);

/// 单个订阅槽，空槽为 handler None
#[derive(Clone, Copy)]
pub(crate) struct EventDesc {
    pub(crate) handler: Option<WlanDevEventHandler>,
    pub(crate) parameter: *mut c_void,
}

impl EventDesc {
    pub(crate) const EMPTY: Self = EventDesc {
        handler: None,
        parameter: core::ptr::null_mut(),
    };
}

/// 订阅表。parameter 在注销前的跨上下文有效性由注册方保证。
pub(crate) struct HandlerTable {
    slots: [[EventDesc; WLAN_DEV_EVENT_NUM]; WLAN_DEV_EVT_MAX],
}

unsafe impl Send for HandlerTable {}

impl HandlerTable {
    pub(crate) const fn new() -> Self {
        Self {
            slots: [[EventDesc::EMPTY; WLAN_DEV_EVENT_NUM]; WLAN_DEV_EVT_MAX],
        }
    }

    /// 写入该事件第一个空槽；无空槽返回 ENOMEM
    pub(crate) fn register(
        &mut self,
        event: WlanDevEvent,
        handler: WlanDevEventHandler,
        parameter: *mut c_void,
    ) -> LinuxResult {
        for slot in self.slots[event as usize].iter_mut() {
            if slot.handler.is_none() {
                *slot = EventDesc {
                    handler: Some(handler),
                    parameter,
                };
                return Ok(());
            }
        }
        Err(LinuxError::ENOMEM)
    }

    /// 按注册时的函数地址精确匹配第一个命中槽并清空；未命中返回 ENOENT
    pub(crate) fn unregister(
        &mut self,
        event: WlanDevEvent,
        handler: WlanDevEventHandler,
    ) -> LinuxResult {
        for slot in self.slots[event as usize].iter_mut() {
            if slot.handler.map(|f| f as usize) == Some(handler as usize) {
                *slot = EventDesc::EMPTY;
                return Ok(());
            }
        }
        Err(LinuxError::ENOENT)
    }

    /// 拷贝该事件的整行槽位，持锁区间仅此一步
    pub(crate) fn snapshot(&self, event: WlanDevEvent) -> [EventDesc; WLAN_DEV_EVENT_NUM] {
        self.slots[event as usize]
    }
}
