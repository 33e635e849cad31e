use std::fs;
use std::path::Path;

const SYS_CLASS_NET: &str = "/sys/class/net";

/// Network devices that are up, loopback excepted, in interface index order.
pub fn available() -> Vec<String> {
    scan(Path::new(SYS_CLASS_NET))
}

fn scan(root: &Path) -> Vec<String> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return vec![],
    };

    let mut devices: Vec<(u32, String)> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name != "lo")
        .filter(|name| read(root, name, "operstate").as_deref() == Some("up"))
        .map(|name| {
            let index = read(root, &name, "ifindex")
                .and_then(|index| index.parse().ok())
                .unwrap_or(u32::MAX);
            (index, name)
        })
        .collect();
    devices.sort();
    devices.into_iter().map(|(_, name)| name).collect()
}

fn read(root: &Path, device: &str, attribute: &str) -> Option<String> {
    fs::read_to_string(root.join(device).join(attribute))
        .ok()
        .map(|value| value.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(root: &Path, name: &str, index: u32, state: &str) {
        let dir = root.join(name);
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("ifindex"), format!("{}\n", index)).unwrap();
        fs::write(dir.join("operstate"), format!("{}\n", state)).unwrap();
    }

    #[test]
    fn only_up_devices_by_index() {
        let root = tempfile::tempdir().unwrap();
        device(root.path(), "lo", 1, "unknown");
        device(root.path(), "wlan0", 3, "up");
        device(root.path(), "eth0", 2, "up");
        device(root.path(), "eth1", 4, "down");
        device(root.path(), "docker0", 9, "up");

        assert_eq!(scan(root.path()), vec!["eth0", "wlan0", "docker0"]);
    }

    #[test]
    fn loopback_never_counts() {
        let root = tempfile::tempdir().unwrap();
        device(root.path(), "lo", 1, "up");
        assert!(scan(root.path()).is_empty());
    }

    #[test]
    fn missing_directory() {
        let root = tempfile::tempdir().unwrap();
        assert!(scan(&root.path().join("nothing")).is_empty());
    }
}
