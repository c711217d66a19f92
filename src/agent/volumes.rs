//! Agent Host Mounts
//!
//! The host paths the vg-manager agent needs for block device discovery and
//! for writing the lvmd configuration.

use crate::config::OperatorConfig;
use k8s_openapi::api::core::v1::{HostPathVolumeSource, Volume, VolumeMount};

// =============================================================================
// Closed Value Sets
// =============================================================================

/// `mountPropagation` value: host mounts become visible in the container
pub const MOUNT_PROPAGATION_HOST_TO_CONTAINER: &str = "HostToContainer";

/// `hostPath.type` value: the directory must already exist
pub const HOST_PATH_DIRECTORY: &str = "Directory";

/// `hostPath.type` value: the directory is created when missing
pub const HOST_PATH_DIRECTORY_OR_CREATE: &str = "DirectoryOrCreate";

// =============================================================================
// Volume Names
// =============================================================================

pub const LVMD_CONF_VOLUME: &str = "lvmd-conf";
pub const DEVICE_DIR_VOLUME: &str = "device-dir";
pub const UDEV_VOLUME: &str = "run-udev";
pub const SYS_VOLUME: &str = "sys";

const DEV_PATH: &str = "/dev";
const UDEV_PATH: &str = "/run/udev";
const SYS_PATH: &str = "/sys";

// =============================================================================
// Host Mount
// =============================================================================

/// A host directory mounted at the same path inside the agent container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMount {
    /// Volume name
    pub name: &'static str,
    /// Path on the host and in the container
    pub path: String,
    /// Host path type check; unchecked when `None`
    pub host_path_type: Option<&'static str>,
}

impl HostMount {
    /// Pod volume for this mount
    pub fn volume(&self) -> Volume {
        Volume {
            name: self.name.to_string(),
            host_path: Some(HostPathVolumeSource {
                path: self.path.clone(),
                type_: self.host_path_type.map(str::to_string),
            }),
            ..Default::default()
        }
    }

    /// Container mount for this volume
    pub fn volume_mount(&self) -> VolumeMount {
        VolumeMount {
            name: self.name.to_string(),
            mount_path: self.path.clone(),
            mount_propagation: Some(MOUNT_PROPAGATION_HOST_TO_CONTAINER.to_string()),
            ..Default::default()
        }
    }
}

/// The four host mounts of the agent: lvmd config, `/dev`, udev database, sysfs
pub fn host_mounts(config: &OperatorConfig) -> Vec<HostMount> {
    vec![
        HostMount {
            name: LVMD_CONF_VOLUME,
            path: config.agent_config_dir(),
            host_path_type: Some(HOST_PATH_DIRECTORY_OR_CREATE),
        },
        HostMount {
            name: DEVICE_DIR_VOLUME,
            path: DEV_PATH.to_string(),
            host_path_type: Some(HOST_PATH_DIRECTORY),
        },
        // lsblk output is more accurate with the udev database available
        HostMount {
            name: UDEV_VOLUME,
            path: UDEV_PATH.to_string(),
            host_path_type: None,
        },
        HostMount {
            name: SYS_VOLUME,
            path: SYS_PATH.to_string(),
            host_path_type: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_mount_layout() {
        let mounts = host_mounts(&OperatorConfig::default());
        let layout: Vec<(&str, &str, Option<&str>)> = mounts
            .iter()
            .map(|m| (m.name, m.path.as_str(), m.host_path_type))
            .collect();

        assert_eq!(
            layout,
            vec![
                ("lvmd-conf", "/etc/topolvm", Some("DirectoryOrCreate")),
                ("device-dir", "/dev", Some("Directory")),
                ("run-udev", "/run/udev", None),
                ("sys", "/sys", None),
            ]
        );
    }

    #[test]
    fn test_config_dir_follows_config() {
        let config = OperatorConfig {
            agent_config_dirname: "lvmd".to_string(),
            ..Default::default()
        };
        let mounts = host_mounts(&config);
        assert_eq!(mounts[0].path, "/etc/lvmd");
        assert_eq!(mounts[0].volume_mount().mount_path, "/etc/lvmd");
    }

    #[test]
    fn test_volume_and_mount_agree() {
        for mount in host_mounts(&OperatorConfig::default()) {
            let volume = mount.volume();
            let volume_mount = mount.volume_mount();
            assert_eq!(volume.name, volume_mount.name);
            assert_eq!(volume.host_path.unwrap().path, volume_mount.mount_path);
            assert_eq!(
                volume_mount.mount_propagation.as_deref(),
                Some(MOUNT_PROPAGATION_HOST_TO_CONTAINER)
            );
        }
    }
}
