pub use enclose::*;

#[macro_export]
macro_rules! observe {
    (( $($d_tt:tt)* ) || $($b:tt)*) => {
        $crate::observe($crate::macros::enclose!(($( $d_tt )*) move || { $($b)* }))
    };
    (|| $($b:tt)*) => {
        $crate::observe(move || { $($b)* })
    };
}

#[macro_export]
macro_rules! compute {
    (( $($d_tt:tt)* ) || $($b:tt)*) => {
        $crate::compute($crate::macros::enclose!(($( $d_tt )*) move || { $($b)* }))
    };
    (|| $($b:tt)*) => {
        $crate::compute(move || { $($b)* })
    };
}
