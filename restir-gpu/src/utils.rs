use glam::{vec3, Vec3};

pub trait Vec3Ext
where
    Self: Sized,
{
    /// Returns luminance of this color-vector.
    fn luma(self) -> f32;

    /// Scales this color-vector so that its luminance doesn't exceed `max`.
    fn clamp_luma(self, max: f32) -> Self;
}

impl Vec3Ext for Vec3 {
    fn luma(self) -> f32 {
        self.dot(vec3(0.2126, 0.7152, 0.0722))
    }

    fn clamp_luma(self, max: f32) -> Self {
        let luma = self.luma();

        if luma > max {
            self * (max / luma)
        } else {
            self
        }
    }
}

pub trait U32Ext
where
    Self: Sized,
{
    fn from_bytes(bytes: [u32; 4]) -> Self;
    fn to_bytes(self) -> [u32; 4];
}

impl U32Ext for u32 {
    fn from_bytes([a, b, c, d]: [u32; 4]) -> Self {
        (a & 0xff) | ((b & 0xff) << 8) | ((c & 0xff) << 16) | ((d & 0xff) << 24)
    }

    fn to_bytes(self) -> [u32; 4] {
        [
            self & 0xff,
            (self >> 8) & 0xff,
            (self >> 16) & 0xff,
            (self >> 24) & 0xff,
        ]
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn from_to_bytes() {
        assert_eq!(0xcafebabe, u32::from_bytes(u32::to_bytes(0xcafebabe)));
        assert_eq!([0xbe, 0xba, 0xfe, 0xca], 0xcafebabe_u32.to_bytes());
    }

    #[test]
    fn clamp_luma() {
        let color = vec3(4.0, 4.0, 4.0);

        assert_relative_eq!(color.clamp_luma(2.0).luma(), 2.0, epsilon = 1e-5);
        assert_eq!(color, color.clamp_luma(10.0));
    }
}
