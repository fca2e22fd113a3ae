//! WLAN 设备抽象
//!
//! 功能包括:
//! - 设备句柄与注册 (wlan_dev_register)
//! - 控制命令分发器 (WlanCmd -> 厂商操作表，每设备互斥串行)
//! - 事件订阅表与指示分发 (固定槽位，先快照后调用)
//! - 厂商操作表 trait (能力可部分实现，缺失即静默跳过)

#![no_std]

extern crate alloc;

mod device;
mod event;
mod ops;
mod types;

pub use device::{wlan_dev_register, WlanCmd, WlanDevice};
pub use event::{WlanDevEvent, WlanDevEventHandler, WLAN_DEV_EVENT_NUM};
pub use ops::{WlanDevOps, WlanDevOpsStub};
pub use types::{
    ApInfo, CountryCode, ScanInfo, StaInfo, WlanBand, WlanFilter, WlanInfo, WlanKey, WlanMode,
    WlanSecurity, WlanSsid, BSSID_LENGTH_MAX_SIZE, KEY_LENGTH_MAX_SIZE, SSID_LENGTH_MAX_SIZE,
};
