//! Parser for `getmac /v /fo list` output.
//!
//! The listing is a sequence of `Label: value` lines. A `Connection Name`
//! line starts a new interface record.
//!
//! ```text
//! Connection Name:  Wi-Fi
//! Network Adapter:  Intel(R) Wi-Fi 6 AX201 160MHz
//! Physical Address: B8-3A-37-04-78-D1
//! Transport Name:   \Device\Tcpip_{1B2C3D4E-0000-1111-2222-333344445555}
//! ```

use super::InterfaceAddress;

/// Parses the list-format `getmac` output into one row per interface.
///
/// Records without a physical address line are dropped. Unknown labels are
/// ignored.
#[must_use]
pub fn parse_getmac_list(output: &str) -> Vec<InterfaceAddress> {
    let mut rows = Vec::new();
    let mut current: Option<Partial> = None;

    for line in output.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let label = label.trim().to_ascii_lowercase();
        let value = value.trim();

        match label.as_str() {
            "connection name" => {
                if let Some(done) = current.take().and_then(Partial::finish) {
                    rows.push(done);
                }
                current = Some(Partial {
                    connection_name: value.to_string(),
                    ..Partial::default()
                });
            }
            "network adapter" => {
                if let Some(partial) = current.as_mut() {
                    partial.network_adapter = Some(value.to_string()).filter(|v| !v.is_empty());
                }
            }
            "physical address" => {
                if let Some(partial) = current.as_mut() {
                    partial.physical_address = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    if let Some(done) = current.and_then(Partial::finish) {
        rows.push(done);
    }

    rows
}

#[derive(Default)]
struct Partial {
    connection_name: String,
    network_adapter: Option<String>,
    physical_address: Option<String>,
}

impl Partial {
    fn finish(self) -> Option<InterfaceAddress> {
        if self.connection_name.is_empty() {
            return None;
        }
        Some(InterfaceAddress {
            connection_name: self.connection_name,
            network_adapter: self.network_adapter,
            physical_address: self.physical_address?,
        })
    }
}
