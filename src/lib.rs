//! WLAN 硬件抽象层
//!
//! 让单一的上层控制接口（连接、扫描、soft-AP 等）驱动多种厂商网卡，
//! 并把网卡的异步事件（链路状态、扫描结果、管理帧）送回上层，上层
//! 无需了解网卡内部实现：
//! - wlandev: 设备句柄、命令分发器、事件订阅与指示
//! - workqueue: 事件回调转投阻塞上下文用的延迟工作队列

#![no_std]

pub use wlandev;
pub use workqueue;

pub use wlandev::{wlan_dev_register, WlanDevOps, WlanDevOpsStub, WlanDevice};
pub use workqueue::{wlan_workqueue_dowork, wlan_workqueue_init};

/// WLAN 子系统一次性初始化：建立延迟工作队列，重复调用幂等。
/// 平台启动流程在注册任何设备之前调用一次。
pub fn wlan_init() -> axerrno::LinuxResult {
    log::info!(target: "wlan", "wlan subsystem init");
    workqueue::wlan_workqueue_init()
}
