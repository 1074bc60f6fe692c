use std::ops::{Add, Div, Mul, Sub};

const PT_PER_MM: f32 = 72.0 / 25.4;

/// Typographic points (1/72 of an inch), the native PDF unit.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Pt(pub f32);

/// Millimetres, the unit all certificate geometry is specified in.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Mm(pub f32);

impl From<Mm> for Pt {
    fn from(value: Mm) -> Self {
        Pt(value.0 * PT_PER_MM)
    }
}

impl From<Pt> for Mm {
    fn from(value: Pt) -> Self {
        Mm(value.0 / PT_PER_MM)
    }
}

impl Add for Pt {
    type Output = Pt;

    fn add(self, rhs: Pt) -> Pt {
        Pt(self.0 + rhs.0)
    }
}

impl Sub for Pt {
    type Output = Pt;

    fn sub(self, rhs: Pt) -> Pt {
        Pt(self.0 - rhs.0)
    }
}

impl Mul<f32> for Pt {
    type Output = Pt;

    fn mul(self, rhs: f32) -> Pt {
        Pt(self.0 * rhs)
    }
}

impl Div<f32> for Pt {
    type Output = Pt;

    fn div(self, rhs: f32) -> Pt {
        Pt(self.0 / rhs)
    }
}

/// Page sizes as (width, height)
pub mod pagesize {
    use super::{Mm, Pt};

    pub const A4_LANDSCAPE_MM: (Mm, Mm) = (Mm(297.0), Mm(210.0));

    pub fn a4_landscape() -> (Pt, Pt) {
        (A4_LANDSCAPE_MM.0.into(), A4_LANDSCAPE_MM.1.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn can_convert_between_mm_and_pt() {
        let pt: Pt = Mm(25.4).into();
        assert!((pt.0 - 72.0).abs() < 1e-4);

        let mm: Mm = Pt(72.0).into();
        assert!((mm.0 - 25.4).abs() < 1e-4);
    }

    #[test]
    fn a4_landscape_is_wider_than_tall() {
        let (w, h) = pagesize::a4_landscape();
        assert!((w.0 - 841.89).abs() < 0.01);
        assert!((h.0 - 595.28).abs() < 0.01);
    }
}
