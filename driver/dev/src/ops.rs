//! 厂商操作表：具体网卡后端可部分实现的能力集合
//!
//! 缺失的能力保持默认实现：动作类默认无操作成功，读取类默认返回
//! None（分发器不改写调用方的输出存储）。上层只能通过调用结果与
//! 设备行为探测能力，不提供单独的能力查询接口。

use axerrno::LinuxResult;

use crate::device::WlanDevice;
use crate::types::{
    ApInfo, CountryCode, ScanInfo, StaInfo, WlanFilter, WlanMode, BSSID_LENGTH_MAX_SIZE,
};

/// 厂商操作表。实现方需可跨线程共享（设备句柄在任意上下文可用）。
pub trait WlanDevOps: Sync {
    /// 设备初始化，在配置初始模式之前调用一次
    fn init(&self, _dev: &WlanDevice) -> LinuxResult {
        Ok(())
    }

    fn set_mode(&self, _dev: &WlanDevice, _mode: WlanMode) -> LinuxResult {
        Ok(())
    }

    /// info 为 None 时扫描全部信道/网络
    fn scan(&self, _dev: &WlanDevice, _info: Option<&ScanInfo>) -> LinuxResult {
        Ok(())
    }

    fn scan_stop(&self, _dev: &WlanDevice) -> LinuxResult {
        Ok(())
    }

    /// station 模式连接
    fn join(&self, _dev: &WlanDevice, _sta: &StaInfo) -> LinuxResult {
        Ok(())
    }

    fn softap_start(&self, _dev: &WlanDevice, _ap: &ApInfo) -> LinuxResult {
        Ok(())
    }

    fn disconnect(&self, _dev: &WlanDevice) -> LinuxResult {
        Ok(())
    }

    fn softap_stop(&self, _dev: &WlanDevice) -> LinuxResult {
        Ok(())
    }

    /// 将指定 MAC 的已关联客户端踢下线
    fn ap_deauth(&self, _dev: &WlanDevice, _mac: &[u8; BSSID_LENGTH_MAX_SIZE]) -> LinuxResult {
        Ok(())
    }

    fn get_rssi(&self, _dev: &WlanDevice) -> Option<i32> {
        None
    }

    fn set_powersave(&self, _dev: &WlanDevice, _enable: bool) -> LinuxResult {
        Ok(())
    }

    fn cfg_promisc(&self, _dev: &WlanDevice, _start: bool) -> LinuxResult {
        Ok(())
    }

    fn cfg_filter(&self, _dev: &WlanDevice, _filter: &WlanFilter) -> LinuxResult {
        Ok(())
    }

    fn set_channel(&self, _dev: &WlanDevice, _channel: i32) -> LinuxResult {
        Ok(())
    }

    fn get_channel(&self, _dev: &WlanDevice) -> Option<i32> {
        None
    }

    fn set_country(&self, _dev: &WlanDevice, _code: CountryCode) -> LinuxResult {
        Ok(())
    }

    fn get_country(&self, _dev: &WlanDevice) -> Option<CountryCode> {
        None
    }

    fn set_mac(&self, _dev: &WlanDevice, _mac: &[u8; BSSID_LENGTH_MAX_SIZE]) -> LinuxResult {
        Ok(())
    }

    fn get_mac(&self, _dev: &WlanDevice) -> Option<[u8; BSSID_LENGTH_MAX_SIZE]> {
        None
    }
}

/// 空操作表：所有能力缺失，用于联调与测试
#[derive(Debug, Default)]
pub struct WlanDevOpsStub;

impl WlanDevOps for WlanDevOpsStub {}
