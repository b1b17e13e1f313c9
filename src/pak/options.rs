//! Read and write options.

/// Options for decoding an archive.
#[derive(Clone, Debug)]
pub struct ReadOptions {
    /// Memory-map the file instead of reading it into memory.
    pub use_mmap: bool,
    /// Require every function entity to call a built-in function or a
    /// composite of the same archive.
    ///
    /// Off by default: [`FunctionType`](crate::core::FunctionType) only
    /// names a subset of the engine's built-ins, so shipped archives can
    /// call functions it does not list.
    pub validate_function_types: bool,
    /// Register composite names and string values in the name cache.
    pub register_names: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            use_mmap: cfg!(feature = "mmap"),
            validate_function_types: false,
            register_names: true,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn with_function_validation(mut self, validate: bool) -> Self {
        self.validate_function_types = validate;
        self
    }

    pub fn with_name_registration(mut self, register: bool) -> Self {
        self.register_names = register;
        self
    }
}

/// Options for encoding an archive.
#[derive(Clone, Debug, Default)]
pub struct WriteOptions {
    /// Recompute every override checksum from its path before writing.
    pub refresh_override_checksums: bool,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_refreshed_checksums(mut self, refresh: bool) -> Self {
        self.refresh_override_checksums = refresh;
        self
    }
}
