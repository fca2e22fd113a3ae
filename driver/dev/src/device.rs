//! 设备句柄、命令分发器与上层控制接口
//!
//! 控制路径全部经 control() 串行化：每设备一把互斥锁，无限等待，
//! 取锁成功后把命令分发到厂商操作表对应的函数。锁只允许在线程
//! 上下文获取（可能长时间阻塞），这是调用方义务，组件不检查。
//! 厂商未实现的能力按无操作成功处理；读取类命令此时不改写调用方
//! 的输出存储，调用方需要区分时应预置哨兵值。

use alloc::string::String;
use alloc::sync::Arc;
use core::ffi::c_void;

use axerrno::{LinuxError, LinuxResult};

use crate::event::{HandlerTable, WlanDevEvent, WlanDevEventHandler};
use crate::ops::WlanDevOps;
use crate::types::{
    ApInfo, CountryCode, ScanInfo, StaInfo, WlanFilter, WlanInfo, WlanKey, WlanMode,
    BSSID_LENGTH_MAX_SIZE, KEY_LENGTH_MAX_SIZE, SSID_LENGTH_MAX_SIZE,
};

/// 控制命令：闭集，读取类命令的输出经变体内的可变引用写回调用方存储
pub enum WlanCmd<'a> {
    Mode(WlanMode),
    Scan(Option<&'a ScanInfo>),
    Join(&'a StaInfo),
    SoftAp(&'a ApInfo),
    Disconnect,
    ApStop,
    ApDeauth(&'a [u8; BSSID_LENGTH_MAX_SIZE]),
    ScanStop,
    GetRssi(&'a mut i32),
    Powersave(bool),
    CfgPromisc(bool),
    CfgFilter(&'a WlanFilter),
    SetChannel(i32),
    GetChannel(&'a mut i32),
    SetCountry(CountryCode),
    GetCountry(&'a mut CountryCode),
    SetMac(&'a [u8; BSSID_LENGTH_MAX_SIZE]),
    GetMac(&'a mut [u8; BSSID_LENGTH_MAX_SIZE]),
}

/// WLAN 设备句柄：持有借用的厂商操作表、当前模式、控制互斥锁与
/// 事件订阅表。经 wlan_dev_register 创建，以 Arc 在各上下文间共享。
pub struct WlanDevice {
    name: String,
    ops: &'static dyn WlanDevOps,
    mode: spin::Mutex<WlanMode>,
    /// 控制路径互斥：仅线程上下文可取
    lock: spin::Mutex<()>,
    handler_table: spin::Mutex<HandlerTable>,
    user_data: *mut c_void,
}

// user_data 与订阅参数的跨上下文有效性由调用方/注册方保证
unsafe impl Send for WlanDevice {}
unsafe impl Sync for WlanDevice {}

/// 注册一个 WLAN 设备并返回句柄。ops 为设备生存期内借用的厂商
/// 操作表；user_data 原样保存，供厂商实现经 user_data() 取回。
pub fn wlan_dev_register(
    name: &str,
    ops: &'static dyn WlanDevOps,
    user_data: *mut c_void,
) -> LinuxResult<Arc<WlanDevice>> {
    if name.is_empty() {
        log::error!(target: "wlan::dev", "register: empty device name");
        return Err(LinuxError::EINVAL);
    }
    log::debug!(target: "wlan::dev", "register device {}", name);
    Ok(Arc::new(WlanDevice {
        name: String::from(name),
        ops,
        mode: spin::Mutex::new(WlanMode::None),
        lock: spin::Mutex::new(()),
        handler_table: spin::Mutex::new(HandlerTable::new()),
        user_data,
    }))
}

impl WlanDevice {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// init 成功后配置的工作模式
    #[inline]
    pub fn mode(&self) -> WlanMode {
        *self.mode.lock()
    }

    #[inline]
    pub fn user_data(&self) -> *mut c_void {
        self.user_data
    }

    /// 初始化设备并配置初始工作模式
    pub fn init(&self, mode: WlanMode) -> LinuxResult {
        log::debug!(target: "wlan::dev", "init device {} mode {:?}", self.name, mode);
        if let Err(e) = self.ops.init(self) {
            log::error!(target: "wlan::dev", "device {} init failed: {:?}", self.name, e);
            return Err(e);
        }
        self.control(WlanCmd::Mode(mode))?;
        *self.mode.lock() = mode;
        log::info!(target: "wlan::dev", "device {} init success, mode {:?}", self.name, mode);
        Ok(())
    }

    /// 连接热点。password 为 None 表示开放网络；密码或 SSID 长度
    /// 达到上限返回 ENAMETOOLONG，厂商 join 不会被调用。
    pub fn connect(&self, info: &WlanInfo, password: Option<&[u8]>) -> LinuxResult {
        let password_len = password.map_or(0, <[u8]>::len);
        if password_len >= KEY_LENGTH_MAX_SIZE || info.ssid.len as usize >= SSID_LENGTH_MAX_SIZE {
            log::error!(target: "wlan::dev", "connect: password or ssid too long");
            return Err(LinuxError::ENAMETOOLONG);
        }
        let mut sta = StaInfo {
            ssid: info.ssid,
            bssid: info.bssid,
            key: WlanKey::empty(),
            channel: info.channel,
            security: info.security,
        };
        if let Some(p) = password {
            sta.key.val[..p.len()].copy_from_slice(p);
            sta.key.len = p.len() as u8;
        }
        self.control(WlanCmd::Join(&sta))
    }

    pub fn disconnect(&self) -> LinuxResult {
        self.control(WlanCmd::Disconnect)
    }

    /// 启动 soft-AP。长度校验与 connect 相同。
    pub fn ap_start(&self, info: &WlanInfo, password: Option<&[u8]>) -> LinuxResult {
        let password_len = password.map_or(0, <[u8]>::len);
        if password_len >= KEY_LENGTH_MAX_SIZE || info.ssid.len as usize >= SSID_LENGTH_MAX_SIZE {
            log::error!(target: "wlan::dev", "ap_start: password or ssid too long");
            return Err(LinuxError::ENAMETOOLONG);
        }
        let mut ap = ApInfo {
            ssid: info.ssid,
            key: WlanKey::empty(),
            hidden: info.hidden,
            channel: info.channel,
            security: info.security,
        };
        if let Some(p) = password {
            ap.key.val[..p.len()].copy_from_slice(p);
            ap.key.len = p.len() as u8;
        }
        self.control(WlanCmd::SoftAp(&ap))
    }

    pub fn ap_stop(&self) -> LinuxResult {
        self.control(WlanCmd::ApStop)
    }

    /// 将指定 MAC 的客户端踢下线
    pub fn ap_deauth(&self, mac: &[u8; BSSID_LENGTH_MAX_SIZE]) -> LinuxResult {
        self.control(WlanCmd::ApDeauth(mac))
    }

    /// 当前 RSSI；厂商未实现时保持 0
    pub fn get_rssi(&self) -> LinuxResult<i32> {
        let mut rssi = 0;
        self.control(WlanCmd::GetRssi(&mut rssi))?;
        Ok(rssi)
    }

    /// MAC 地址；厂商未实现时保持全零
    pub fn get_mac(&self) -> LinuxResult<[u8; BSSID_LENGTH_MAX_SIZE]> {
        let mut mac = [0; BSSID_LENGTH_MAX_SIZE];
        self.control(WlanCmd::GetMac(&mut mac))?;
        Ok(mac)
    }

    pub fn set_mac(&self, mac: &[u8; BSSID_LENGTH_MAX_SIZE]) -> LinuxResult {
        self.control(WlanCmd::SetMac(mac))
    }

    pub fn enable_powersave(&self) -> LinuxResult {
        self.control(WlanCmd::Powersave(true))
    }

    pub fn disable_powersave(&self) -> LinuxResult {
        self.control(WlanCmd::Powersave(false))
    }

    /// 注册事件回调：写入该事件第一个空槽；满则 ENOMEM
    pub fn register_event_handler(
        &self,
        event: WlanDevEvent,
        handler: WlanDevEventHandler,
        parameter: *mut c_void,
    ) -> LinuxResult {
        self.handler_table.lock().register(event, handler, parameter)
    }

    /// 注销事件回调：按注册时的函数地址精确匹配；未命中 ENOENT
    pub fn unregister_event_handler(
        &self,
        event: WlanDevEvent,
        handler: WlanDevEventHandler,
    ) -> LinuxResult {
        self.handler_table.lock().unregister(event, handler)
    }

    /// 指示事件：持锁快照该事件整行槽位，释放锁后按槽位顺序调用
    /// 非空回调。本方法可从中断样上下文调用；回调在调用方上下文
    /// 同步执行，不得阻塞。
    pub fn indicate_event(&self, event: WlanDevEvent, payload: Option<&[u8]>) -> LinuxResult {
        log::trace!(target: "wlan::dev", "device {} indicate {:?}", self.name, event);
        let snapshot = self.handler_table.lock().snapshot(event);
        for desc in snapshot.iter() {
            if let Some(handler) = desc.handler {
                handler(self, event, payload, desc.parameter);
            }
        }
        Ok(())
    }

    pub fn enter_promisc(&self) -> LinuxResult {
        self.control(WlanCmd::CfgPromisc(true))
    }

    pub fn exit_promisc(&self) -> LinuxResult {
        self.control(WlanCmd::CfgPromisc(false))
    }

    pub fn cfg_filter(&self, filter: &WlanFilter) -> LinuxResult {
        self.control(WlanCmd::CfgFilter(filter))
    }

    pub fn set_channel(&self, channel: i32) -> LinuxResult {
        if channel < 0 {
            return Err(LinuxError::EINVAL);
        }
        self.control(WlanCmd::SetChannel(channel))
    }

    /// 当前信道；厂商未实现时保持 -1
    pub fn get_channel(&self) -> LinuxResult<i32> {
        let mut channel = -1;
        self.control(WlanCmd::GetChannel(&mut channel))?;
        Ok(channel)
    }

    pub fn set_country(&self, country: CountryCode) -> LinuxResult {
        self.control(WlanCmd::SetCountry(country))
    }

    /// 当前国家/地区码；厂商未实现时保持 Unknown
    pub fn get_country(&self) -> LinuxResult<CountryCode> {
        let mut country = CountryCode::Unknown;
        self.control(WlanCmd::GetCountry(&mut country))?;
        Ok(country)
    }

    /// 扫描。info 指定 SSID/BSSID 过滤；SSID 长度达到上限返回
    /// ENAMETOOLONG。信道范围不限。
    pub fn scan(&self, info: Option<&WlanInfo>) -> LinuxResult {
        match info {
            Some(info) => {
                if info.ssid.len as usize >= SSID_LENGTH_MAX_SIZE {
                    log::error!(target: "wlan::dev", "scan: ssid too long");
                    return Err(LinuxError::ENAMETOOLONG);
                }
                let scan_info = ScanInfo {
                    ssid: info.ssid,
                    bssid: info.bssid,
                    channel_min: -1,
                    channel_max: -1,
                };
                self.control(WlanCmd::Scan(Some(&scan_info)))
            }
            None => self.control(WlanCmd::Scan(None)),
        }
    }

    pub fn scan_stop(&self) -> LinuxResult {
        self.control(WlanCmd::ScanStop)
    }

    /// 控制命令入口：取设备锁后把命令分发到厂商操作表。命令与
    /// 厂商操作一一对应；锁为 RAII guard，任何返回路径都会释放。
    pub fn control(&self, cmd: WlanCmd<'_>) -> LinuxResult {
        let _guard = self.lock.lock();
        match cmd {
            WlanCmd::Mode(mode) => {
                log::debug!(target: "wlan::dev", "control cmd: mode {:?} run", mode);
                self.ops.set_mode(self, mode)
            }
            WlanCmd::Scan(info) => {
                log::debug!(target: "wlan::dev", "control cmd: scan run");
                self.ops.scan(self, info)
            }
            WlanCmd::Join(sta) => {
                log::debug!(target: "wlan::dev", "control cmd: join run");
                self.ops.join(self, sta)
            }
            WlanCmd::SoftAp(ap) => {
                log::debug!(target: "wlan::dev", "control cmd: softap run");
                self.ops.softap_start(self, ap)
            }
            WlanCmd::Disconnect => {
                log::debug!(target: "wlan::dev", "control cmd: disconnect run");
                self.ops.disconnect(self)
            }
            WlanCmd::ApStop => {
                log::debug!(target: "wlan::dev", "control cmd: ap_stop run");
                self.ops.softap_stop(self)
            }
            WlanCmd::ApDeauth(mac) => {
                log::debug!(target: "wlan::dev", "control cmd: ap_deauth run");
                self.ops.ap_deauth(self, mac)
            }
            WlanCmd::ScanStop => {
                log::debug!(target: "wlan::dev", "control cmd: scan_stop run");
                self.ops.scan_stop(self)
            }
            WlanCmd::GetRssi(rssi) => {
                log::debug!(target: "wlan::dev", "control cmd: get_rssi run");
                if let Some(v) = self.ops.get_rssi(self) {
                    *rssi = v;
                }
                Ok(())
            }
            WlanCmd::Powersave(enable) => {
                log::debug!(target: "wlan::dev", "control cmd: powersave {} run", enable);
                self.ops.set_powersave(self, enable)
            }
            WlanCmd::CfgPromisc(start) => {
                log::debug!(target: "wlan::dev", "control cmd: cfg_promisc {} run", start);
                self.ops.cfg_promisc(self, start)
            }
            WlanCmd::CfgFilter(filter) => {
                log::debug!(target: "wlan::dev", "control cmd: cfg_filter run");
                self.ops.cfg_filter(self, filter)
            }
            WlanCmd::SetChannel(channel) => {
                log::debug!(target: "wlan::dev", "control cmd: set_channel {} run", channel);
                self.ops.set_channel(self, channel)
            }
            WlanCmd::GetChannel(channel) => {
                log::debug!(target: "wlan::dev", "control cmd: get_channel run");
                if let Some(v) = self.ops.get_channel(self) {
                    *channel = v;
                }
                Ok(())
            }
            WlanCmd::SetCountry(country) => {
                log::debug!(target: "wlan::dev", "control cmd: set_country {:?} run", country);
                self.ops.set_country(self, country)
            }
            WlanCmd::GetCountry(country) => {
                log::debug!(target: "wlan::dev", "control cmd: get_country run");
                if let Some(v) = self.ops.get_country(self) {
                    *country = v;
                }
                Ok(())
            }
            WlanCmd::SetMac(mac) => {
                log::debug!(target: "wlan::dev", "control cmd: set_mac run");
                self.ops.set_mac(self, mac)
            }
            WlanCmd::GetMac(mac) => {
                log::debug!(target: "wlan::dev", "control cmd: get_mac run");
                if let Some(v) = self.ops.get_mac(self) {
                    *mac = v;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::WlanDevOpsStub;
    use crate::types::WlanSecurity;
    use core::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

    static STUB_OPS: WlanDevOpsStub = WlanDevOpsStub;

    fn stub_dev(name: &str) -> Arc<WlanDevice> {
        wlan_dev_register(name, &STUB_OPS, core::ptr::null_mut()).unwrap()
    }

    /// 记录 join 参数、带专用信道操作的后端
    struct CaptureOps {
        last_join: spin::Mutex<Option<StaInfo>>,
        channel: AtomicI32,
    }

    impl WlanDevOps for CaptureOps {
        fn join(&self, _dev: &WlanDevice, sta: &StaInfo) -> LinuxResult {
            *self.last_join.lock() = Some(*sta);
            Ok(())
        }

        fn set_channel(&self, _dev: &WlanDevice, channel: i32) -> LinuxResult {
            self.channel.store(channel, Ordering::SeqCst);
            Ok(())
        }

        fn get_channel(&self, _dev: &WlanDevice) -> Option<i32> {
            Some(self.channel.load(Ordering::SeqCst))
        }
    }

    static CAPTURE_OPS: CaptureOps = CaptureOps {
        last_join: spin::Mutex::new(None),
        channel: AtomicI32::new(6),
    };

    #[test]
    fn missing_capability_is_noop_success() {
        let dev = stub_dev("wlan0");
        dev.init(WlanMode::Station).unwrap();
        assert_eq!(dev.mode(), WlanMode::Station);
        dev.disconnect().unwrap();
        dev.enable_powersave().unwrap();
        dev.enter_promisc().unwrap();
        dev.ap_deauth(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(dev.get_rssi().unwrap(), 0);
        assert_eq!(dev.get_mac().unwrap(), [0; BSSID_LENGTH_MAX_SIZE]);
        assert_eq!(dev.get_channel().unwrap(), -1);
        assert_eq!(dev.get_country().unwrap(), CountryCode::Unknown);

        // 输出存储保持调用方预置的哨兵
        let mut rssi = -12345;
        dev.control(WlanCmd::GetRssi(&mut rssi)).unwrap();
        assert_eq!(rssi, -12345);
    }

    #[test]
    fn connect_password_length_bound() {
        let dev = wlan_dev_register("wlan1", &CAPTURE_OPS, core::ptr::null_mut()).unwrap();
        let mut info = WlanInfo::default();
        info.ssid = crate::types::WlanSsid::new(b"office-ap").unwrap();
        info.bssid = [2, 3, 4, 5, 6, 7];
        info.channel = 11;
        info.security = WlanSecurity::Wpa2AesPsk;

        let long = [b'x'; KEY_LENGTH_MAX_SIZE];
        assert_eq!(
            dev.connect(&info, Some(&long[..])),
            Err(LinuxError::ENAMETOOLONG)
        );
        assert!(CAPTURE_OPS.last_join.lock().is_none());

        let ok = [b'x'; KEY_LENGTH_MAX_SIZE - 1];
        dev.connect(&info, Some(&ok[..])).unwrap();
        let sta = CAPTURE_OPS.last_join.lock().take().unwrap();
        assert_eq!(sta.ssid, info.ssid);
        assert_eq!(sta.bssid, info.bssid);
        assert_eq!(sta.channel, 11);
        assert_eq!(sta.security, WlanSecurity::Wpa2AesPsk);
        assert_eq!(sta.key.as_bytes(), &ok[..]);
    }

    #[test]
    fn channel_ops_are_dedicated() {
        let dev = wlan_dev_register("wlan2", &CAPTURE_OPS, core::ptr::null_mut()).unwrap();
        dev.set_channel(13).unwrap();
        assert_eq!(dev.get_channel().unwrap(), 13);
        assert_eq!(dev.set_channel(-1), Err(LinuxError::EINVAL));
    }

    #[test]
    fn event_slots_exhaust_and_recover() {
        static RAN_A: AtomicUsize = AtomicUsize::new(0);
        static RAN_B: AtomicUsize = AtomicUsize::new(0);
        static RAN_C: AtomicUsize = AtomicUsize::new(0);
        fn ha(_d: &WlanDevice, _e: WlanDevEvent, _p: Option<&[u8]>, _param: *mut c_void) {
            RAN_A.fetch_add(1, Ordering::SeqCst);
        }
        fn hb(_d: &WlanDevice, _e: WlanDevEvent, _p: Option<&[u8]>, _param: *mut c_void) {
            RAN_B.fetch_add(1, Ordering::SeqCst);
        }
        fn hc(_d: &WlanDevice, _e: WlanDevEvent, _p: Option<&[u8]>, _param: *mut c_void) {
            RAN_C.fetch_add(1, Ordering::SeqCst);
        }

        let dev = stub_dev("wlan3");
        let ev = WlanDevEvent::Connect;
        dev.register_event_handler(ev, ha, core::ptr::null_mut()).unwrap();
        dev.register_event_handler(ev, hb, core::ptr::null_mut()).unwrap();
        assert_eq!(
            dev.register_event_handler(ev, hc, core::ptr::null_mut()),
            Err(LinuxError::ENOMEM)
        );

        dev.unregister_event_handler(ev, ha).unwrap();
        dev.register_event_handler(ev, hc, core::ptr::null_mut()).unwrap();

        // 未注册的 handler 注销返回 ENOENT，且订阅表不受影响
        assert_eq!(dev.unregister_event_handler(ev, ha), Err(LinuxError::ENOENT));

        dev.indicate_event(ev, None).unwrap();
        assert_eq!(RAN_A.load(Ordering::SeqCst), 0);
        assert_eq!(RAN_B.load(Ordering::SeqCst), 1);
        assert_eq!(RAN_C.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_zero_handlers_ok() {
        let dev = stub_dev("wlan4");
        dev.indicate_event(WlanDevEvent::ScanDone, None).unwrap();
    }

    #[test]
    fn dispatch_in_slot_order_with_payload() {
        static SEQ: AtomicUsize = AtomicUsize::new(0);
        static CELL_A: AtomicUsize = AtomicUsize::new(0);
        static CELL_B: AtomicUsize = AtomicUsize::new(0);
        fn seq_handler(_d: &WlanDevice, _e: WlanDevEvent, payload: Option<&[u8]>, param: *mut c_void) {
            assert_eq!(payload, Some(&b"evt-payload"[..]));
            let cell = unsafe { &*(param as *const AtomicUsize) };
            cell.store(SEQ.fetch_add(1, Ordering::SeqCst) + 1, Ordering::SeqCst);
        }

        let dev = stub_dev("wlan5");
        let ev = WlanDevEvent::ScanReport;
        dev.register_event_handler(ev, seq_handler, &CELL_A as *const _ as *mut c_void)
            .unwrap();
        dev.register_event_handler(ev, seq_handler, &CELL_B as *const _ as *mut c_void)
            .unwrap();
        dev.indicate_event(ev, Some(&b"evt-payload"[..])).unwrap();

        // 快照内每个回调恰好执行一次，按槽位顺序
        assert_eq!(CELL_A.load(Ordering::SeqCst), 1);
        assert_eq!(CELL_B.load(Ordering::SeqCst), 2);
        assert_eq!(SEQ.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reentrant_register_unregister_from_handler() {
        static LATE: AtomicUsize = AtomicUsize::new(0);
        fn late_handler(_d: &WlanDevice, _e: WlanDevEvent, _p: Option<&[u8]>, _param: *mut c_void) {
            LATE.fetch_add(1, Ordering::SeqCst);
        }
        // 分发中注销自己并注册另一事件的回调，快照分发不得死锁
        fn reentrant_handler(dev: &WlanDevice, _e: WlanDevEvent, _p: Option<&[u8]>, _param: *mut c_void) {
            dev.unregister_event_handler(WlanDevEvent::Disconnect, reentrant_handler)
                .unwrap();
            dev.register_event_handler(WlanDevEvent::ScanDone, late_handler, core::ptr::null_mut())
                .unwrap();
        }

        let dev = stub_dev("wlan6");
        dev.register_event_handler(WlanDevEvent::Disconnect, reentrant_handler, core::ptr::null_mut())
            .unwrap();
        dev.indicate_event(WlanDevEvent::Disconnect, None).unwrap();
        dev.indicate_event(WlanDevEvent::Disconnect, None).unwrap();
        dev.indicate_event(WlanDevEvent::ScanDone, None).unwrap();
        assert_eq!(LATE.load(Ordering::SeqCst), 1);
    }
}
