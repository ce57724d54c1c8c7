/// Implements a componentwise binary operator (and its assigning variant) for
/// a fixed-size array newtype, for both owned and borrowed operands.
macro_rules! impl_componentwise_op {
    (impl $trait:ident, $assign_trait:ident for $type:ident { fn $func:ident(), fn $assign_func:ident() }) => {
        impl $trait for $type {
            type Output = $type;

            fn $func(self, rhs: $type) -> $type {
                $type(std::array::from_fn(|i| $trait::$func(self.0[i], rhs.0[i])))
            }
        }
        impl<'a> $trait<&'a $type> for $type {
            type Output = $type;

            fn $func(self, rhs: &'a $type) -> $type {
                $trait::$func(self, *rhs)
            }
        }
        impl<'a> $trait<$type> for &'a $type {
            type Output = $type;

            fn $func(self, rhs: $type) -> $type {
                $trait::$func(*self, rhs)
            }
        }
        impl<'a, 'b> $trait<&'b $type> for &'a $type {
            type Output = $type;

            fn $func(self, rhs: &'b $type) -> $type {
                $trait::$func(*self, *rhs)
            }
        }
        impl $assign_trait for $type {
            fn $assign_func(&mut self, rhs: $type) {
                for (l, r) in std::iter::zip(&mut self.0, rhs.0) {
                    $assign_trait::$assign_func(l, r);
                }
            }
        }
    };
}

/// Implements multiplication and division by a scalar for a fixed-size array
/// newtype.
macro_rules! impl_scalar_ops {
    (impl for $type:ident) => {
        impl Mul<Float> for $type {
            type Output = $type;

            fn mul(self, rhs: Float) -> $type {
                $type(self.0.map(|x| x * rhs))
            }
        }
        impl Mul<$type> for Float {
            type Output = $type;

            fn mul(self, rhs: $type) -> $type {
                rhs * self
            }
        }
        impl Div<Float> for $type {
            type Output = $type;

            #[allow(clippy::suspicious_arithmetic_impl)]
            fn div(self, rhs: Float) -> $type {
                let mult = 1.0 / rhs;
                $type(self.0.map(|x| x * mult))
            }
        }
        impl MulAssign<Float> for $type {
            fn mul_assign(&mut self, rhs: Float) {
                for x in &mut self.0 {
                    *x *= rhs;
                }
            }
        }
        impl Neg for $type {
            type Output = $type;

            fn neg(self) -> $type {
                $type(self.0.map(|x| -x))
            }
        }
    };
}
