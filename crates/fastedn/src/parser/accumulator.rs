/// Growable scratch space for tokens that do not fit in the current buffer.
///
/// Scanners only reach for it on the slow path: when a token crosses a refill
/// or a string contains escapes. Capacity doubles on overflow and is kept
/// between tokens.
#[derive(Debug)]
pub(crate) struct Accumulator {
    chars: Vec<char>,
}

const INITIAL_CAPACITY: usize = 32;

impl Accumulator {
    pub(crate) fn new() -> Self {
        Self {
            chars: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.chars.clear();
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[char] {
        &self.chars
    }

    #[inline]
    pub(crate) fn push(&mut self, c: char) {
        self.reserve(1);
        self.chars.push(c);
    }

    #[inline]
    pub(crate) fn extend_from_slice(&mut self, chars: &[char]) {
        self.reserve(chars.len());
        self.chars.extend_from_slice(chars);
    }

    pub(crate) fn collect_string(&self) -> String {
        self.chars.iter().collect()
    }

    fn reserve(&mut self, additional: usize) {
        let needed = self.chars.len() + additional;
        if needed > self.chars.capacity() {
            let target = needed.max(self.chars.capacity() * 2);
            self.chars.reserve_exact(target - self.chars.len());
        }
    }
}
