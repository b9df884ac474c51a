//! Inputs the scan driver accepts from the hosting view.

/// Command sent to a running scan driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCommand {
    /// New value of the page's activation flag
    SetActive(bool),
    /// The page is unmounting; release everything and stop
    Teardown,
}
