//! Declarative `Decode` implementations

/// Implement [`Decode`](crate::Decode) for a struct with named fields
///
/// The struct must implement `Default`; fields the input does not mention
/// keep their current value. Each field matches the key of the same name
/// (exact first, then ASCII case-insensitive) unless renamed with `=> "key"`.
/// Raw identifier fields such as `r#type` match the key `type`.
///
/// ```rust,ignore
/// #[derive(Debug, Default)]
/// struct Config {
///     global_name: String,
///     freq: Duration,
///     items: HashMap<String, Box<dyn Plugin>>,
/// }
///
/// polyconf::decode_struct!(Config {
///     global_name => "globalname",
///     freq,
///     items,
/// });
/// ```
#[macro_export]
macro_rules! decode_struct {
    (@key $field:ident) => {{
        let key: &str = stringify!($field);
        // raw identifiers (`r#type`) match the bare key
        key.strip_prefix("r#").unwrap_or(key)
    }};
    (@key $field:ident $key:literal) => {
        $key
    };
    ($ty:ty { $($field:ident $(=> $key:literal)?),* $(,)? }) => {
        impl $crate::Decode for $ty {
            fn decode(
                value: $crate::Value,
                de: &$crate::Decoder<'_>,
            ) -> ::core::result::Result<Self, $crate::DecodeError> {
                let mut this = <$ty as ::core::default::Default>::default();
                $crate::Decode::decode_in_place(&mut this, value, de)?;
                Ok(this)
            }

            fn decode_in_place(
                &mut self,
                value: $crate::Value,
                de: &$crate::Decoder<'_>,
            ) -> ::core::result::Result<(), $crate::DecodeError> {
                let mut fields = de.struct_fields(value, stringify!($ty))?;
                $(
                    fields.field($crate::decode_struct!(@key $field $($key)?), &mut self.$field)?;
                )*
                fields.finish()
            }
        }
    };
}

/// Implement [`Decode`](crate::Decode) for types parsed from strings
///
/// The type advertises a parse capability through its
/// [`Target`](crate::Target); [`StringUnmarshalHook`](crate::hooks::StringUnmarshalHook)
/// builds it from string nodes. Any other node is a type mismatch.
#[macro_export]
macro_rules! decode_from_str {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Decode for $ty {
            fn target() -> $crate::Target {
                $crate::Target::of::<Self>().with_parse::<Self>()
            }

            fn decode(
                value: $crate::Value,
                de: &$crate::Decoder<'_>,
            ) -> ::core::result::Result<Self, $crate::DecodeError> {
                Err(de.mismatch("string", &value))
            }
        }
    )+};
}
