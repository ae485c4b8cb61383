// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for reducing boilerplate.
//!
//! - [`simple_display!`] — `Display` impl mapping enum variants to string literals
//! - [`builder!`] — test builder struct with Default, setters, and `build()`
//! - [`setters!`] — setter methods for production builder/config structs

/// Generate a `Display` impl that maps enum variants to string literals.
///
/// Unit variants match directly; data-carrying variants use `(..)` to ignore fields.
///
/// ```ignore
/// crate::simple_display! {
///     TaskStatus {
///         NeedsAction => "needs-action",
///         Completed => "completed",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident $(( $($ignore:tt)* ))? => $str:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $( Self::$variant $(( $($ignore)* ))? => $str, )+
                })
            }
        }
    };
}

/// Generate a test builder (struct + Default + setters + build).
///
/// All generated items are gated behind `#[cfg(any(test, feature = "test-support"))]`.
///
/// Field groups:
/// - `into { field: Type = default }` — setter uses `impl Into<Type>`
/// - `set { field: Type = default }` — setter takes `Type` directly
/// - `option { field: Type = default }` — builder field is `Option<Type>`,
///   setter wraps in `Some(v.into())`
/// - `computed { field: Type = expr }` — no builder field or setter;
///   value computed at build time
#[macro_export]
macro_rules! builder {
    (
        pub struct $builder:ident => $target:ident {
            $($body:tt)*
        }
    ) => {
        $crate::__builder_munch! {
            @munch
            builder = $builder,
            target = $target,
            into = [],
            set = [],
            option = [],
            computed = [],
            rest = { $($body)* }
        }
    };
}

/// Implementation detail of [`builder!`]: a tt-muncher that collects the
/// (possibly repeated, arbitrarily ordered) `into`/`set`/`option`/`computed`
/// blocks into one bucket per kind before emitting the builder.
#[doc(hidden)]
#[macro_export]
macro_rules! __builder_munch {
    (
        @munch
        builder = $builder:ident,
        target = $target:ident,
        into = [$($into_field:ident : $into_ty:ty = $into_default:expr),* $(,)?],
        set = [$($set:tt)*],
        option = [$($option:tt)*],
        computed = [$($computed:tt)*],
        rest = {
            into { $( $new_into_field:ident : $new_into_ty:ty = $new_into_default:expr ),* $(,)? }
            $($more:tt)*
        }
    ) => {
        $crate::__builder_munch! {
            @munch
            builder = $builder,
            target = $target,
            into = [$($into_field : $into_ty = $into_default,)* $($new_into_field : $new_into_ty = $new_into_default,)*],
            set = [$($set)*],
            option = [$($option)*],
            computed = [$($computed)*],
            rest = { $($more)* }
        }
    };

    (
        @munch
        builder = $builder:ident,
        target = $target:ident,
        into = [$($into:tt)*],
        set = [$($set_field:ident : $set_ty:ty = $set_default:expr),* $(,)?],
        option = [$($option:tt)*],
        computed = [$($computed:tt)*],
        rest = {
            set { $( $new_set_field:ident : $new_set_ty:ty = $new_set_default:expr ),* $(,)? }
            $($more:tt)*
        }
    ) => {
        $crate::__builder_munch! {
            @munch
            builder = $builder,
            target = $target,
            into = [$($into)*],
            set = [$($set_field : $set_ty = $set_default,)* $($new_set_field : $new_set_ty = $new_set_default,)*],
            option = [$($option)*],
            computed = [$($computed)*],
            rest = { $($more)* }
        }
    };

    (
        @munch
        builder = $builder:ident,
        target = $target:ident,
        into = [$($into:tt)*],
        set = [$($set:tt)*],
        option = [$($opt_field:ident : $opt_ty:ty = $opt_default:expr),* $(,)?],
        computed = [$($computed:tt)*],
        rest = {
            option { $( $new_opt_field:ident : $new_opt_ty:ty = $new_opt_default:expr ),* $(,)? }
            $($more:tt)*
        }
    ) => {
        $crate::__builder_munch! {
            @munch
            builder = $builder,
            target = $target,
            into = [$($into)*],
            set = [$($set)*],
            option = [$($opt_field : $opt_ty = $opt_default,)* $($new_opt_field : $new_opt_ty = $new_opt_default,)*],
            computed = [$($computed)*],
            rest = { $($more)* }
        }
    };

    (
        @munch
        builder = $builder:ident,
        target = $target:ident,
        into = [$($into:tt)*],
        set = [$($set:tt)*],
        option = [$($option:tt)*],
        computed = [$($comp_field:ident : $comp_ty:ty = $comp_expr:expr),* $(,)?],
        rest = {
            computed { $( $new_comp_field:ident : $new_comp_ty:ty = $new_comp_expr:expr ),* $(,)? }
            $($more:tt)*
        }
    ) => {
        $crate::__builder_munch! {
            @munch
            builder = $builder,
            target = $target,
            into = [$($into)*],
            set = [$($set)*],
            option = [$($option)*],
            computed = [$($comp_field : $comp_ty = $comp_expr,)* $($new_comp_field : $new_comp_ty = $new_comp_expr,)*],
            rest = { $($more)* }
        }
    };

    (
        @munch
        builder = $builder:ident,
        target = $target:ident,
        into = [$($into_field:ident : $into_ty:ty = $into_default:expr),* $(,)?],
        set = [$($set_field:ident : $set_ty:ty = $set_default:expr),* $(,)?],
        option = [$($opt_field:ident : $opt_ty:ty = $opt_default:expr),* $(,)?],
        computed = [$($comp_field:ident : $comp_ty:ty = $comp_expr:expr),* $(,)?],
        rest = {}
    ) => {
        #[cfg(any(test, feature = "test-support"))]
        pub struct $builder {
            $( $into_field: $into_ty, )*
            $( $set_field: $set_ty, )*
            $( $opt_field: Option<$opt_ty>, )*
        }

        #[cfg(any(test, feature = "test-support"))]
        impl Default for $builder {
            fn default() -> Self {
                Self {
                    $( $into_field: $into_default.into(), )*
                    $( $set_field: $set_default, )*
                    $( $opt_field: $opt_default, )*
                }
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $builder {
            $(
                pub fn $into_field(mut self, v: impl Into<$into_ty>) -> Self {
                    self.$into_field = v.into();
                    self
                }
            )*

            $(
                pub fn $set_field(mut self, v: $set_ty) -> Self {
                    self.$set_field = v;
                    self
                }
            )*

            $(
                pub fn $opt_field(mut self, v: impl Into<$opt_ty>) -> Self {
                    self.$opt_field = Some(v.into());
                    self
                }
            )*

            pub fn build(self) -> $target {
                $target {
                    $( $into_field: self.$into_field, )*
                    $( $set_field: self.$set_field, )*
                    $( $opt_field: self.$opt_field, )*
                    $( $comp_field: $comp_expr, )*
                }
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $target {
            /// Create a builder with test defaults.
            pub fn builder() -> $builder {
                $builder::default()
            }
        }
    };
}

/// Generate setter methods inside an existing `impl` block.
///
/// Field groups work the same as [`builder!`] but only generate setter methods.
#[macro_export]
macro_rules! setters {
    (
        $(into {
            $( $into_field:ident : $into_ty:ty ),* $(,)?
        })?
        $(set {
            $( $set_field:ident : $set_ty:ty ),* $(,)?
        })?
        $(option {
            $( $opt_field:ident : $opt_ty:ty ),* $(,)?
        })?
    ) => {
        $($(
            pub fn $into_field(mut self, v: impl Into<$into_ty>) -> Self {
                self.$into_field = v.into();
                self
            }
        )*)?

        $($(
            pub fn $set_field(mut self, v: $set_ty) -> Self {
                self.$set_field = v;
                self
            }
        )*)?

        $($(
            pub fn $opt_field(mut self, v: impl Into<$opt_ty>) -> Self {
                self.$opt_field = Some(v.into());
                self
            }
        )*)?
    };
}
