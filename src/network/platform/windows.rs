//! Windows adapter discovery using `GetAdaptersAddresses`, with `netsh`
//! fallbacks.

use crate::command;
use crate::network::parse::{parse_interface_table, parse_wlan_interfaces};
use crate::network::{
    AdapterDiscovery, AdapterIdentity, AdapterKind, DiscoveryError, discover_with_fallbacks,
};
use windows::Win32::Foundation::WIN32_ERROR;
use windows::Win32::NetworkManagement::IpHelper::{
    GAA_FLAG_SKIP_ANYCAST, GAA_FLAG_SKIP_DNS_SERVER, GAA_FLAG_SKIP_MULTICAST,
    GAA_FLAG_SKIP_UNICAST, GET_ADAPTERS_ADDRESSES_FLAGS, GetAdaptersAddresses,
    IF_TYPE_ETHERNET_CSMACD, IF_TYPE_IEEE80211, IF_TYPE_SOFTWARE_LOOPBACK, IP_ADAPTER_ADDRESSES_LH,
};
use windows::Win32::Networking::WinSock::AF_UNSPEC;

/// Interface type for PPP (Point-to-Point Protocol) adapters.
/// Value from Windows SDK `iptypes.h` - not exported by the `windows` crate.
const IF_TYPE_PPP: u32 = 23;

/// Interface type for tunnel adapters (VPN, etc.).
/// Value from Windows SDK `iptypes.h` - not exported by the `windows` crate.
const IF_TYPE_TUNNEL: u32 = 131;

/// Buffer size hint for `GetAdaptersAddresses`.
/// The API will tell us the actual required size if this is insufficient.
const INITIAL_BUFFER_SIZE: u32 = 16384;

/// Windows implementation of [`AdapterDiscovery`].
///
/// Strategies, in order:
/// 1. `GetAdaptersAddresses` (name, interface GUID, interface type)
/// 2. `netsh wlan show interfaces` (name, GUID) if step 1 found no wireless adapter
/// 3. `netsh interface show interface` name heuristic (no GUID)
///
/// Steps 2 and 3 are only consulted when step 1 yields no wireless adapter,
/// and their results are merged and de-duplicated by name.
#[derive(Debug, Clone, Default)]
pub struct WindowsDiscovery {
    _private: (),
}

impl WindowsDiscovery {
    /// Creates a new Windows adapter discovery.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl AdapterDiscovery for WindowsDiscovery {
    fn discover(&self) -> Result<Vec<AdapterIdentity>, DiscoveryError> {
        discover_with_fallbacks(enumerate_adapters(), || {
            vec![
                netsh_fallback(&["wlan", "show", "interfaces"], parse_wlan_interfaces),
                netsh_fallback(&["interface", "show", "interface"], parse_interface_table),
            ]
        })
    }
}

/// Runs one `netsh` fallback and parses its output.
fn netsh_fallback(
    args: &[&str],
    parse: fn(&str) -> Vec<AdapterIdentity>,
) -> Result<Vec<AdapterIdentity>, DiscoveryError> {
    let output = command::run("netsh", args)?;
    Ok(parse(&output))
}

/// Enumerates all adapters using `GetAdaptersAddresses`.
fn enumerate_adapters() -> Result<Vec<AdapterIdentity>, DiscoveryError> {
    let raw_adapters = get_adapter_addresses()?;

    let mut adapters = Vec::new();
    // SAFETY: GetAdaptersAddresses returns a properly aligned buffer for IP_ADAPTER_ADDRESSES_LH.
    #[allow(clippy::cast_ptr_alignment)]
    let mut current = raw_adapters.as_ptr().cast::<IP_ADAPTER_ADDRESSES_LH>();

    // SAFETY: We iterate through a linked list returned by GetAdaptersAddresses.
    // The list is valid as long as the buffer (`raw_adapters`) is alive.
    while !current.is_null() {
        let adapter = unsafe { &*current };

        if let Some(identity) = parse_adapter(adapter) {
            adapters.push(identity);
        }

        current = adapter.Next;
    }

    Ok(adapters)
}

/// Calls `GetAdaptersAddresses` and returns the raw buffer containing adapter data.
///
/// Addresses themselves are not needed, so every address list is skipped.
fn get_adapter_addresses() -> Result<Vec<u8>, DiscoveryError> {
    let flags = GAA_FLAG_SKIP_UNICAST
        | GAA_FLAG_SKIP_ANYCAST
        | GAA_FLAG_SKIP_MULTICAST
        | GAA_FLAG_SKIP_DNS_SERVER;
    let family = u32::from(AF_UNSPEC.0);

    let mut buffer: Vec<u8> = vec![0u8; INITIAL_BUFFER_SIZE as usize];
    let mut size = INITIAL_BUFFER_SIZE;

    // SAFETY: We provide a valid buffer and size. The function writes adapter
    // information to the buffer and updates `size` with the required length.
    let result = unsafe {
        GetAdaptersAddresses(
            family,
            flags,
            None,
            Some(buffer.as_mut_ptr().cast()),
            &raw mut size,
        )
    };

    handle_api_result(result, &mut buffer, &mut size, flags, family)?;

    Ok(buffer)
}

/// Handles the result of `GetAdaptersAddresses`, retrying once with a larger
/// buffer on overflow.
#[cfg(not(tarpaulin_include))]
fn handle_api_result(
    result: u32,
    buffer: &mut Vec<u8>,
    size: &mut u32,
    flags: GET_ADAPTERS_ADDRESSES_FLAGS,
    family: u32,
) -> Result<(), DiscoveryError> {
    use windows::Win32::Foundation::{ERROR_BUFFER_OVERFLOW, NO_ERROR};

    if result == ERROR_BUFFER_OVERFLOW.0 {
        buffer.resize(*size as usize, 0);

        // SAFETY: Same as above, but with correctly sized buffer
        let result = unsafe {
            GetAdaptersAddresses(
                family,
                flags,
                None,
                Some(buffer.as_mut_ptr().cast()),
                &raw mut *size,
            )
        };

        if result != NO_ERROR.0 {
            return Err(windows::core::Error::from(WIN32_ERROR(result)).into());
        }
    } else if result != NO_ERROR.0 {
        return Err(windows::core::Error::from(WIN32_ERROR(result)).into());
    }

    Ok(())
}

/// Parses a single `IP_ADAPTER_ADDRESSES_LH` structure into an [`AdapterIdentity`].
///
/// Returns `None` if the friendly name cannot be read. `AdapterName` holds the
/// interface GUID, which is what the adapter class registry keys reference.
fn parse_adapter(adapter: &IP_ADAPTER_ADDRESSES_LH) -> Option<AdapterIdentity> {
    let name = unsafe { adapter.FriendlyName.to_string().ok()? };
    if name.is_empty() {
        return None;
    }

    let guid = if adapter.AdapterName.is_null() {
        String::new()
    } else {
        unsafe { adapter.AdapterName.to_string().unwrap_or_default() }
    };

    Some(AdapterIdentity::new(
        name,
        guid,
        map_adapter_type(adapter.IfType),
    ))
}

/// Maps Windows `IF_TYPE_*` constants to [`AdapterKind`].
const fn map_adapter_type(if_type: u32) -> AdapterKind {
    match if_type {
        IF_TYPE_ETHERNET_CSMACD => AdapterKind::Ethernet,
        IF_TYPE_IEEE80211 => AdapterKind::Wireless,
        IF_TYPE_SOFTWARE_LOOPBACK => AdapterKind::Loopback,
        IF_TYPE_TUNNEL | IF_TYPE_PPP => AdapterKind::Virtual,
        other => AdapterKind::Other(other),
    }
}
