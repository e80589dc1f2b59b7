//! Convenience macros for extension development.

/// Exports an extension from a `cdylib` so `DynamicLoader` can load it.
///
/// Emits the ABI version symbol and the constructor symbol. The argument is
/// any expression producing a value that implements `Extension`.
///
/// # Example
/// ```rust,ignore
/// use gallery_extension::prelude::*;
///
/// struct Hello;
///
/// #[async_trait]
/// impl Extension for Hello {}
///
/// export_extension!(Hello);
/// ```
#[macro_export]
macro_rules! export_extension {
    ($ctor:expr) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn gallery_extension_abi_version() -> u32 {
            $crate::loader::EXTENSION_ABI_VERSION
        }

        #[unsafe(no_mangle)]
        pub extern "Rust" fn gallery_extension_create() -> ::std::boxed::Box<dyn $crate::extension::Extension> {
            ::std::boxed::Box::new($ctor)
        }
    };
}
