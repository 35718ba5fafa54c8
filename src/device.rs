use std::fmt;

use crate::errors::{Error, Result};

/// Memory location of a tensor's data.
///
/// Only [`Device::Cpu`] memory can be allocated and accessed by this crate.
/// Other devices can be attached to tensors wrapping foreign memory so that
/// their metadata can be passed around.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Device {
    #[default]
    Cpu,
    /// CUDA device with the given index.
    Cuda(i32),
    /// OpenCL device with the given index.
    OpenCl(i32),
}

impl Device {
    /// Create a device from a numeric type code (0 = CPU, 1 = CUDA,
    /// 2 = OpenCL) and a device index.
    pub fn from_code(code: i32, index: i32) -> Result<Device> {
        match code {
            0 => Ok(Device::Cpu),
            1 => Ok(Device::Cuda(index)),
            2 => Ok(Device::OpenCl(index)),
            _ => Err(Error::invalid_argument(format!(
                "invalid device type {}",
                code
            ))),
        }
    }

    /// Return the numeric type code of this device.
    pub fn code(self) -> i32 {
        match self {
            Device::Cpu => 0,
            Device::Cuda(_) => 1,
            Device::OpenCl(_) => 2,
        }
    }

    /// Return the device index. The CPU always has index 0.
    pub fn index(self) -> i32 {
        match self {
            Device::Cpu => 0,
            Device::Cuda(index) | Device::OpenCl(index) => index,
        }
    }

    pub fn is_cpu(self) -> bool {
        self == Device::Cpu
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "CPU"),
            Device::Cuda(index) => write!(f, "CUDA:{}", index),
            Device::OpenCl(index) => write!(f, "OpenCL:{}", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Device;
    use crate::ErrorKind;

    #[test]
    fn test_device() {
        assert_eq!(Device::default(), Device::Cpu);
        assert_eq!(Device::Cpu.to_string(), "CPU");
        assert_eq!(Device::Cuda(1).to_string(), "CUDA:1");
        assert_eq!(Device::OpenCl(0).to_string(), "OpenCL:0");

        for device in [Device::Cpu, Device::Cuda(2), Device::OpenCl(3)] {
            assert_eq!(Device::from_code(device.code(), device.index()).unwrap(), device);
        }
        assert!(Device::Cpu.is_cpu());
        assert!(!Device::Cuda(0).is_cpu());
    }

    #[test]
    fn test_invalid_device_code() {
        let err = Device::from_code(7, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        assert_eq!(serde_json::to_string(&Device::Cpu).unwrap(), "\"Cpu\"");
        assert_eq!(serde_json::to_string(&Device::Cuda(1)).unwrap(), "{\"Cuda\":1}");
        for device in [Device::Cpu, Device::Cuda(2), Device::OpenCl(0)] {
            let json = serde_json::to_string(&device).unwrap();
            let parsed: Device = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, device);
        }
        assert!(serde_json::from_str::<Device>("{\"Metal\":0}").is_err());
    }
}
