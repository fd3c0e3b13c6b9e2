use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Number of consecutive (`00`..`19`) columns in a rank table.
pub const CONSECUTIVE_SLOTS: usize = 20;
/// Number of month-coded (`01M`..`12M`) columns in a rank table.
pub const MONTH_SLOTS: usize = 12;

static CONTRACT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+)(\d{2})(\d{2})\.([A-Z]+)$").expect("valid regex"));

// Month columns only look at the leading part of the code.
static MONTH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]+\d{2}(\d{2})").expect("valid regex"));

/// A contract code of the form `<PRODUCT><YYMM>.<EXCHANGE>`, e.g. `AG2401.XSGE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCode {
    pub product: String,
    pub year: u32,
    pub month: u32,
    pub exchange: String,
}

impl ContractCode {
    pub fn parse(code: &str) -> Option<Self> {
        let caps = CONTRACT_CODE.captures(code)?;
        Some(ContractCode {
            product: caps[1].to_string(),
            year: caps[2].parse().ok()?,
            month: caps[3].parse().ok()?,
            exchange: caps[4].to_string(),
        })
    }

    pub fn continuous_code(&self, key: RoleKey) -> String {
        format!("{}{}.{}", self.product, key.suffix(), self.exchange)
    }
}

impl fmt::Display for ContractCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:02}{:02}.{}",
            self.product, self.year, self.month, self.exchange
        )
    }
}

/// Month component of the `YYMM` token, ignoring the year.
pub fn month_of(code: &str) -> Option<u32> {
    MONTH_TOKEN
        .captures(code)
        .and_then(|caps| caps[1].parse().ok())
}

/// True when `code` is a listing of `product`: the leading letters are exactly
/// the product symbol and are followed by a digit, so `A2401.XDCE` belongs to
/// `A` but `AG2401.XSGE` does not.
pub fn belongs_to(code: &str, product: &str) -> bool {
    match code.strip_prefix(product) {
        Some(rest) => rest.chars().next().is_some_and(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Column of a wide role or rank table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoleKey {
    Dominant,
    Subdominant,
    /// Rank among the listed contracts of a day, 0 is the nearest expiry.
    Consecutive(u8),
    /// Nearest contract expiring in the given month (1-12).
    Month(u8),
}

impl RoleKey {
    pub fn suffix(&self) -> String {
        match self {
            RoleKey::Dominant => String::new(),
            RoleKey::Subdominant => "_S".to_string(),
            RoleKey::Consecutive(rank) => format!("{:02}", rank),
            RoleKey::Month(month) => format!("{:02}M", month),
        }
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleKey::Dominant => write!(f, "dominant"),
            RoleKey::Subdominant => write!(f, "subdominant"),
            _ => write!(f, "{}", self.suffix()),
        }
    }
}
