/// Register a struct as a `Record` by listing its addressable fields.
///
/// ```ignore
/// record!(Person { id, name, age });
/// record!(Person { id, name } nested { address });
/// ```
///
/// Plain fields take their kind from the field's `FieldValue` impl; nested
/// fields must themselves be `Record`s and are flattened into `outer.inner`
/// paths. The shape is built on first use and cached in a `OnceLock`.
#[macro_export]
macro_rules! record {
    (
        $ty:ident { $( $field:ident ),* $(,)? }
        $( nested { $( $nested:ident ),* $(,)? } )?
    ) => {
        impl $crate::traits::Record for $ty {
            fn shape() -> &'static $crate::model::Shape<Self> {
                static SHAPE: ::std::sync::OnceLock<$crate::model::Shape<$ty>> =
                    ::std::sync::OnceLock::new();

                SHAPE.get_or_init(|| {
                    $crate::model::Shape::<$ty>::builder(stringify!($ty))
                        $( .field(stringify!($field), |r: &$ty| &r.$field) )*
                        $( $( .nested(stringify!($nested), |r: &$ty| &r.$nested) )* )?
                        .build()
                })
            }
        }
    };
}
