use crate::models::metric::MetricKind;

/// Operating-system family, as far as `df` output is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Darwin,
    FreeBsd,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux")        { Platform::Linux }
        else if cfg!(target_os = "macos")   { Platform::Darwin }
        else if cfg!(target_os = "freebsd") { Platform::FreeBsd }
        else                                { Platform::Other }
    }
}

/// Where the numbers live inside `DeviceRecord::fields`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Columns {
    /// total, used, free and percent are all printed.
    Direct { total: usize, used: usize, free: usize, pct: usize },
    /// No total column; total is used + free.
    DerivedTotal { used: usize, free: usize, pct: usize },
}

/// Column layout of one `df` invocation, selected once per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// GNU `df -k -T`: Filesystem Type 1K-blocks Used Available Use% Mounted on
    GnuSpace,
    /// GNU `df -i -T`: Filesystem Type Inodes IUsed IFree IUse% Mounted on
    GnuInodes,
    /// BSD/POSIX `df -k`: Filesystem 1024-blocks Used Available Capacity ... Mounted on
    PosixSpace,
    /// BSD `df -i`: Filesystem 512-blocks Used Available Capacity iused ifree %iused Mounted on
    BsdInodes,
}

impl Layout {
    /// None when the platform has no usable inode listing.
    pub fn select(platform: Platform, kind: MetricKind) -> Option<Self> {
        match (platform, kind) {
            (Platform::Linux, MetricKind::Space)  => Some(Layout::GnuSpace),
            (Platform::Linux, MetricKind::Inodes) => Some(Layout::GnuInodes),
            (Platform::Darwin | Platform::FreeBsd, MetricKind::Space)  => Some(Layout::PosixSpace),
            (Platform::Darwin | Platform::FreeBsd, MetricKind::Inodes) => Some(Layout::BsdInodes),
            (Platform::Other, MetricKind::Space)  => Some(Layout::PosixSpace),
            (Platform::Other, MetricKind::Inodes) => None,
        }
    }

    pub fn has_type_column(&self) -> bool {
        matches!(self, Layout::GnuSpace | Layout::GnuInodes)
    }

    /// Index in the raw token list of the first numeric column.
    pub fn numeric_start(&self) -> usize {
        if self.has_type_column() { 2 } else { 1 }
    }

    pub fn columns(&self) -> Columns {
        match self {
            Layout::GnuSpace | Layout::GnuInodes | Layout::PosixSpace => {
                Columns::Direct { total: 0, used: 1, free: 2, pct: 3 }
            }
            Layout::BsdInodes => Columns::DerivedTotal { used: 4, free: 5, pct: 6 },
        }
    }

    pub fn df_args(&self) -> &'static [&'static str] {
        match self {
            Layout::GnuSpace   => &["-k", "-T"],
            Layout::GnuInodes  => &["-i", "-T"],
            Layout::PosixSpace => &["-k"],
            Layout::BsdInodes  => &["-i"],
        }
    }
}
