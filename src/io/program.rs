/// Location of a loaded script within the program store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Program {
    pub start_index: usize,
    pub length: usize,
}
