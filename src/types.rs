/// Caller-facing literal: `±(var + 1)`, never zero.
pub type Lit = i32;

/// Three-valued truth used for polarity hints and model values.
///
/// The numeric codes match the classic `lbool` layout: `0` is true,
/// `1` is false, anything else is undefined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LBool {
    True,
    False,
    #[default]
    Undef,
}

impl LBool {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => LBool::True,
            1 => LBool::False,
            _ => LBool::Undef,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            LBool::True => 0,
            LBool::False => 1,
            LBool::Undef => 2,
        }
    }

    pub fn is_true(self) -> bool {
        self == LBool::True
    }

    pub fn is_undef(self) -> bool {
        self == LBool::Undef
    }
}

impl From<bool> for LBool {
    fn from(value: bool) -> Self {
        if value {
            LBool::True
        } else {
            LBool::False
        }
    }
}

impl From<Option<bool>> for LBool {
    fn from(value: Option<bool>) -> Self {
        value.map_or(LBool::Undef, LBool::from)
    }
}

impl std::ops::Not for LBool {
    type Output = LBool;

    fn not(self) -> Self::Output {
        match self {
            LBool::True => LBool::False,
            LBool::False => LBool::True,
            LBool::Undef => LBool::Undef,
        }
    }
}
