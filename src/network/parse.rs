//! Parsers for the textual discovery fallbacks.
//!
//! These operate on captured command output so they can be tested on any
//! platform; the Windows discovery feeds them `netsh` output.

use super::{AdapterIdentity, AdapterKind};

/// Keywords that mark an interface name as wireless in the heuristic fallback.
const WIRELESS_NAME_HINTS: [&str; 3] = ["wireless", "wi-fi", "wifi"];

/// Parses `netsh wlan show interfaces` output.
///
/// Each interface block starts with a `Name` line; a following `GUID` line
/// (or `Interface GUID` on some builds) supplies the instance ID. Blocks
/// without a GUID are still reported with no instance ID.
#[must_use]
pub fn parse_wlan_interfaces(output: &str) -> Vec<AdapterIdentity> {
    let mut adapters = Vec::new();
    let mut current: Option<(String, String)> = None;

    for line in output.lines() {
        let Some((key, value)) = split_field(line) else {
            continue;
        };

        match key.as_str() {
            "name" => {
                if let Some((name, guid)) = current.take() {
                    adapters.push(AdapterIdentity::new(name, guid, AdapterKind::Wireless));
                }
                current = Some((value, String::new()));
            }
            "guid" | "interface guid" => {
                if let Some((_, guid)) = current.as_mut() {
                    *guid = value;
                }
            }
            _ => {}
        }
    }

    if let Some((name, guid)) = current {
        adapters.push(AdapterIdentity::new(name, guid, AdapterKind::Wireless));
    }

    adapters
}

/// Parses `netsh interface show interface` output, keeping rows whose name
/// looks wireless.
///
/// The table has four columns (`Admin State`, `State`, `Type`,
/// `Interface Name`) and the name may contain spaces. No instance ID is
/// available from this source.
#[must_use]
pub fn parse_interface_table(output: &str) -> Vec<AdapterIdentity> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 || !matches!(parts[0], "Enabled" | "Disabled") {
                return None;
            }

            let name = parts[3..].join(" ");
            let lowered = name.to_lowercase();
            WIRELESS_NAME_HINTS
                .iter()
                .any(|hint| lowered.contains(hint))
                .then(|| AdapterIdentity::new(name, "", AdapterKind::Wireless))
        })
        .collect()
}

/// Splits a `Key : Value` line into a lowercased key and a trimmed,
/// unquoted value.
fn split_field(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(':')?;
    let value = value.trim().trim_matches('"').to_string();
    Some((key.trim().to_lowercase(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WLAN_OUTPUT: &str = r#"
There is 2 interfaces on the system:

    Name                   : Wi-Fi
    Description            : Intel(R) Wi-Fi 6 AX201 160MHz
    GUID                   : 1b2c3d4e-0000-1111-2222-333344445555
    Physical address       : b8:3a:37:04:78:d1
    State                  : connected

    Name                   : "Wi-Fi 2"
    Description            : USB Wireless LAN Card
    GUID                   : 99999999-8888-7777-6666-555555555555
    State                  : disconnected
"#;

    const INTERFACE_TABLE: &str = r"
Admin State    State          Type             Interface Name
-------------------------------------------------------------------------
Enabled        Connected      Dedicated        Ethernet
Enabled        Connected      Dedicated        Wi-Fi
Disabled       Disconnected   Dedicated        Wireless Network Connection 2
Enabled        Disconnected   Dedicated        vEthernet (WSL)
";

    mod wlan_interfaces {
        use super::*;

        #[test]
        fn parses_each_block_with_guid() {
            let adapters = parse_wlan_interfaces(WLAN_OUTPUT);

            assert_eq!(adapters.len(), 2);
            assert_eq!(adapters[0].name, "Wi-Fi");
            assert_eq!(
                adapters[0].instance_id(),
                Some("1b2c3d4e-0000-1111-2222-333344445555")
            );
            assert_eq!(adapters[1].name, "Wi-Fi 2");
            assert_eq!(
                adapters[1].instance_id(),
                Some("99999999-8888-7777-6666-555555555555")
            );
            assert!(adapters.iter().all(|a| a.kind.is_wireless()));
        }

        #[test]
        fn block_without_guid_has_no_instance_id() {
            let output = "    Name : Wi-Fi\n    State : connected\n";

            let adapters = parse_wlan_interfaces(output);

            assert_eq!(adapters.len(), 1);
            assert_eq!(adapters[0].instance_id(), None);
        }

        #[test]
        fn accepts_interface_guid_label() {
            let output = "Name : Wi-Fi\nInterface GUID : {ABC}\n";

            let adapters = parse_wlan_interfaces(output);

            assert_eq!(adapters[0].instance_id(), Some("{ABC}"));
        }

        #[test]
        fn no_interfaces_yields_empty() {
            let output = "There is no wireless interface on the system.";
            assert!(parse_wlan_interfaces(output).is_empty());
        }
    }

    mod interface_table {
        use super::*;

        #[test]
        fn keeps_only_wireless_looking_names() {
            let adapters = parse_interface_table(INTERFACE_TABLE);

            let names: Vec<&str> = adapters.iter().map(|a| a.name.as_str()).collect();
            assert_eq!(names, ["Wi-Fi", "Wireless Network Connection 2"]);
            assert!(adapters.iter().all(|a| a.instance_id().is_none()));
        }

        #[test]
        fn ignores_header_and_separator_rows() {
            let output = "Admin State    State    Type    Interface Name\n------\n";
            assert!(parse_interface_table(output).is_empty());
        }
    }
}
