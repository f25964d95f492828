use std::fmt;
use std::str::FromStr;

/// GPU backend family. Two mutually exclusive choices: the platform's
/// modern native API, or the legacy OpenGL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Modern,
    Legacy,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::Modern, BackendKind::Legacy];

    /// wgpu backend set to request for this family.
    pub fn backends(self) -> wgpu::Backends {
        match self {
            BackendKind::Modern => wgpu::Backends::PRIMARY,
            BackendKind::Legacy => wgpu::Backends::GL,
        }
    }

    /// Human-readable label for the controls panel.
    pub fn label(self) -> &'static str {
        match self {
            BackendKind::Modern => "Modern (Vulkan/Metal/DX12)",
            BackendKind::Legacy => "Legacy (OpenGL)",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Modern => write!(f, "modern"),
            BackendKind::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "modern" => Ok(BackendKind::Modern),
            "legacy" | "gl" => Ok(BackendKind::Legacy),
            other => Err(format!("unknown backend '{other}' (expected modern or legacy)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_from_cli_strings() {
        assert_eq!("modern".parse::<BackendKind>().unwrap(), BackendKind::Modern);
        assert_eq!("Legacy".parse::<BackendKind>().unwrap(), BackendKind::Legacy);
        assert_eq!("gl".parse::<BackendKind>().unwrap(), BackendKind::Legacy);
        assert!("webgpu".parse::<BackendKind>().is_err());
    }

    #[test]
    fn families_are_disjoint() {
        let modern = BackendKind::Modern.backends();
        let legacy = BackendKind::Legacy.backends();
        assert_eq!(modern & legacy, wgpu::Backends::empty());
    }

    #[test]
    fn display_round_trips() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }
}
