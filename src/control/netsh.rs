//! `netsh`/`getmac` backed [`InterfaceControl`].

use super::{AdminState, ControlError, InterfaceAddress, InterfaceControl, parse_getmac_list};
use crate::command;
use crate::network::MacAddress;

/// Adapter control through `netsh interface set interface` and `getmac`.
///
/// Requires an elevated process for state changes. Only meaningful on
/// Windows; elsewhere every call fails to launch.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetshControl;

impl NetshControl {
    /// Creates the control.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl InterfaceControl for NetshControl {
    fn set_admin_state(
        &self,
        adapter: &str,
        state: AdminState,
        address: Option<&MacAddress>,
    ) -> Result<(), ControlError> {
        let args = admin_state_args(adapter, state, address);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        command::run("netsh", &args)?;
        Ok(())
    }

    fn query_addresses(&self) -> Result<Vec<InterfaceAddress>, ControlError> {
        let output = command::run("getmac", &["/v", "/fo", "list"])?;
        Ok(parse_getmac_list(&output))
    }
}

/// Builds the `netsh` arguments for a state change.
///
/// The address, when present, precedes the admin state so both are applied
/// by the same invocation.
#[must_use]
pub fn admin_state_args(
    adapter: &str,
    state: AdminState,
    address: Option<&MacAddress>,
) -> Vec<String> {
    let mut args = vec![
        "interface".to_string(),
        "set".to_string(),
        "interface".to_string(),
        adapter.to_string(),
    ];
    if let Some(mac) = address {
        args.push(format!("ethernet={mac}"));
    }
    args.push(format!("admin={state}"));
    args
}
