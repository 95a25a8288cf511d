//! Entity transparency

/// Transparency of an entity.
///
/// Serialized as code 440 from AC1018 on; older dialects drop it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transparency {
    /// Use the layer's transparency
    #[default]
    ByLayer,
    /// Use the block's transparency
    ByBlock,
    /// Explicit transparency percentage (0 = opaque, 90 = most transparent)
    Percent(u8),
}

impl Transparency {
    pub const OPAQUE: Transparency = Transparency::Percent(0);

    /// Packed wire value (code 440)
    pub fn value(&self) -> i32 {
        match self {
            Transparency::ByLayer => 0,
            Transparency::ByBlock => 0x0100_0000,
            Transparency::Percent(p) => {
                let alpha = 255 - ((255 * (*p as i32)) / 100);
                0x0200_0000 | alpha
            }
        }
    }

    /// Create from the packed wire value
    pub fn from_value(value: i32) -> Self {
        if value & 0x0200_0000 != 0 {
            let alpha = value & 0xFF;
            let percent = ((255 - alpha) * 100 / 255).clamp(0, 90) as u8;
            Transparency::Percent(percent)
        } else if value & 0x0100_0000 != 0 {
            Transparency::ByBlock
        } else {
            Transparency::ByLayer
        }
    }

    /// Whether this transparency is worth a group on the wire
    pub fn is_default(&self) -> bool {
        matches!(self, Transparency::ByLayer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_roundtrip() {
        let t = Transparency::OPAQUE;
        assert_eq!(Transparency::from_value(t.value()), t);
    }

    #[test]
    fn test_byblock_roundtrip() {
        let t = Transparency::ByBlock;
        assert_eq!(Transparency::from_value(t.value()), t);
    }

    #[test]
    fn test_percent_survives() {
        let t = Transparency::Percent(50);
        match Transparency::from_value(t.value()) {
            Transparency::Percent(p) => assert!((49..=51).contains(&p)),
            other => panic!("unexpected {:?}", other),
        }
    }
}
