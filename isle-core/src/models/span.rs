///
/// Anything that occupies a closed interval `[start, end]` on one chromosome.
///
/// Windows and every island flavour store their end coordinate inclusively, so the
/// length of a span is `end - start + 1`.
///
pub trait GenomicSpan {
    fn chrom(&self) -> &str;
    fn start(&self) -> u32;
    fn end(&self) -> u32;

    ///
    /// Number of bases covered, counting both ends.
    ///
    fn length(&self) -> u32 {
        self.end() - self.start() + 1
    }

    ///
    /// Whether `position` falls inside `[start, end]`.
    ///
    fn contains(&self, position: u32) -> bool {
        self.start() <= position && position <= self.end()
    }
}
