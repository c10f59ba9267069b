//! Helper macro generating `thiserror` port error enums with snake_case
//! constructors for every variant.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum DraftStoreError {
            Gone => "draft no longer exists",
            Refused { message: String } => "draft refused: {message}",
            RateLimited { retry_after: u32 } => "retry drafts in {retry_after}s",
            Upstream { message: String, status: u16 } => "upstream {status}: {message}",
        }
    }

    #[test]
    fn unit_variant_constructor_takes_no_arguments() {
        assert_eq!(DraftStoreError::gone(), DraftStoreError::Gone);
        assert_eq!(DraftStoreError::gone().to_string(), "draft no longer exists");
    }

    #[test]
    fn string_fields_accept_borrowed_text() {
        assert_eq!(
            DraftStoreError::refused("title is blank").to_string(),
            "draft refused: title is blank"
        );
    }

    #[test]
    fn typed_fields_pass_through() {
        assert_eq!(
            DraftStoreError::rate_limited(30_u32).to_string(),
            "retry drafts in 30s"
        );
        assert_eq!(
            DraftStoreError::upstream("bad gateway", 502_u16).to_string(),
            "upstream 502: bad gateway"
        );
    }
}
