//! 基础类型：工作模式、安全类型、定长 SSID/密钥与各类请求结构
//!
//! SSID 与密码采用定长数组加显式长度，长度达到上限即拒绝
//! （有效长度严格小于上限），在进入厂商层之前完成校验。

use axerrno::{LinuxError, LinuxResult};

/// SSID 最大长度
pub const SSID_LENGTH_MAX_SIZE: usize = 32;
/// 密码/密钥最大长度
pub const KEY_LENGTH_MAX_SIZE: usize = 32;
/// BSSID 长度
pub const BSSID_LENGTH_MAX_SIZE: usize = 6;

/// 设备工作模式
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WlanMode {
    None = 0,
    Station,
    Ap,
    Monitor,
}

/// 安全类型
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WlanSecurity {
    Open = 0,
    WepPsk,
    WepShared,
    WpaTkipPsk,
    WpaAesPsk,
    Wpa2TkipPsk,
    Wpa2AesPsk,
    Wpa2MixedPsk,
    Unknown,
}

/// 频段
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WlanBand {
    Band2G4 = 0,
    Band5G,
}

/// 国家/地区码，Unknown 为未知哨兵
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryCode {
    Unknown = 0,
    World,
    China,
    UnitedStates,
    Canada,
    Europe,
    Japan,
    SouthKorea,
    Australia,
    Brazil,
}

/// 定长 SSID：val[..len] 为有效内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WlanSsid {
    pub len: u8,
    pub val: [u8; SSID_LENGTH_MAX_SIZE],
}

impl WlanSsid {
    pub const fn empty() -> Self {
        Self {
            len: 0,
            val: [0; SSID_LENGTH_MAX_SIZE],
        }
    }

    /// 由字节串构造，长度达到上限返回 ENAMETOOLONG
    pub fn new(ssid: &[u8]) -> LinuxResult<Self> {
        if ssid.len() >= SSID_LENGTH_MAX_SIZE {
            return Err(LinuxError::ENAMETOOLONG);
        }
        let mut s = Self::empty();
        s.val[..ssid.len()].copy_from_slice(ssid);
        s.len = ssid.len() as u8;
        Ok(s)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.val[..(self.len as usize).min(SSID_LENGTH_MAX_SIZE)]
    }
}

/// 定长密钥
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WlanKey {
    pub len: u8,
    pub val: [u8; KEY_LENGTH_MAX_SIZE],
}

impl WlanKey {
    pub const fn empty() -> Self {
        Self {
            len: 0,
            val: [0; KEY_LENGTH_MAX_SIZE],
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.val[..(self.len as usize).min(KEY_LENGTH_MAX_SIZE)]
    }
}

/// 上层描述的一个无线网络
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WlanInfo {
    pub ssid: WlanSsid,
    pub bssid: [u8; BSSID_LENGTH_MAX_SIZE],
    pub band: WlanBand,
    pub channel: i32,
    pub rssi: i32,
    pub security: WlanSecurity,
    /// AP 是否隐藏 SSID
    pub hidden: bool,
}

impl Default for WlanInfo {
    fn default() -> Self {
        Self {
            ssid: WlanSsid::empty(),
            bssid: [0; BSSID_LENGTH_MAX_SIZE],
            band: WlanBand::Band2G4,
            channel: 0,
            rssi: 0,
            security: WlanSecurity::Open,
            hidden: false,
        }
    }
}

/// station 连接请求，connect 组装后交给厂商 join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaInfo {
    pub ssid: WlanSsid,
    pub bssid: [u8; BSSID_LENGTH_MAX_SIZE],
    pub key: WlanKey,
    pub channel: i32,
    pub security: WlanSecurity,
}

/// soft-AP 启动请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApInfo {
    pub ssid: WlanSsid,
    pub key: WlanKey,
    pub hidden: bool,
    pub channel: i32,
    pub security: WlanSecurity,
}

/// 扫描请求：channel_min/channel_max 为 -1 表示不限信道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanInfo {
    pub ssid: WlanSsid,
    pub bssid: [u8; BSSID_LENGTH_MAX_SIZE],
    pub channel_min: i32,
    pub channel_max: i32,
}

/// 接收过滤配置：按帧类型掩码过滤，mac 全零表示不按地址过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WlanFilter {
    pub mac: [u8; BSSID_LENGTH_MAX_SIZE],
    pub frame_mask: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssid_length_bound() {
        assert!(WlanSsid::new(&[b'a'; SSID_LENGTH_MAX_SIZE - 1]).is_ok());
        assert_eq!(
            WlanSsid::new(&[b'a'; SSID_LENGTH_MAX_SIZE]),
            Err(LinuxError::ENAMETOOLONG)
        );
        let s = WlanSsid::new(b"ap-test").unwrap();
        assert_eq!(s.as_bytes(), b"ap-test");
    }
}
