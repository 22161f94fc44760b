pub trait Configuration: Clone + Send + Sync + 'static {
    fn website_title(&self) -> String;
    fn port(&self) -> String;
    fn cookie_name(&self) -> String;
    fn expiry_days(&self) -> i64;
    fn size_warning_bytes(&self) -> usize;
}
