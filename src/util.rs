use crate::error::Error;
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, SliceInfoElem, Zip};
use std::fmt::{self, Display, Formatter};

/// Where the values of a [`Quantity`](crate::Quantity) live.
///
/// Only the host is supported; the type exists so that device placement is an explicit part of
/// every vector's API, and moving to the device a vector is already on is a no-op.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Device {
    #[default]
    Cpu,
}

impl Display for Device {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => f.write_str("cpu"),
        }
    }
}

/// Element type of a [`Quantity`](crate::Quantity).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DType {
    #[default]
    Float64,
}

impl Display for DType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float64 => f.write_str("float64"),
        }
    }
}

/// Computes the shape all of `shapes` broadcast to, following the usual right-aligned rules.
pub(crate) fn broadcast_shapes<'a>(
    shapes: impl IntoIterator<Item = &'a [usize]>,
) -> Result<Vec<usize>, Error> {
    let mut out: Vec<usize> = Vec::new();
    for shape in shapes {
        if shape.len() > out.len() {
            let mut padded = vec![1; shape.len() - out.len()];
            padded.extend_from_slice(&out);
            out = padded;
        }
        let offset = out.len() - shape.len();
        for (i, &dim) in shape.iter().enumerate() {
            let current = &mut out[offset + i];
            if *current == dim || dim == 1 {
                continue;
            }
            if *current == 1 {
                *current = dim;
            } else {
                return Err(Error::Broadcast {
                    left: out.clone(),
                    right: shape.to_vec(),
                });
            }
        }
    }
    Ok(out)
}

pub(crate) fn broadcast_view<'a>(
    array: &'a ArrayD<f64>,
    shape: &[usize],
) -> Result<ArrayViewD<'a, f64>, Error> {
    array.broadcast(shape).ok_or_else(|| Error::Broadcast {
        left: array.shape().to_vec(),
        right: shape.to_vec(),
    })
}

/// Broadcasts every array to their common shape and materializes the result.
pub(crate) fn broadcast_arrays(arrays: &[&ArrayD<f64>]) -> Result<Vec<ArrayD<f64>>, Error> {
    let shape = broadcast_shapes(arrays.iter().map(|a| a.shape()))?;
    arrays
        .iter()
        .map(|a| broadcast_view(a, &shape).map(|v| v.to_owned()))
        .collect()
}

/// Broadcasts `arrays` together and stacks them along a new trailing axis.
pub(crate) fn stack_arrays(arrays: &[&ArrayD<f64>]) -> Result<ArrayD<f64>, Error> {
    let shape = broadcast_shapes(arrays.iter().map(|a| a.shape()))?;
    let views = arrays
        .iter()
        .map(|a| broadcast_view(a, &shape))
        .collect::<Result<Vec<_>, _>>()?;
    ndarray::stack(Axis(shape.len()), &views).map_err(|_| Error::Broadcast {
        left: shape.clone(),
        right: shape,
    })
}

/// Applies `f` elementwise across the broadcast of `inputs`, producing `O` arrays of the
/// broadcast shape.
pub(crate) fn map_elements<const I: usize, const O: usize>(
    inputs: [&ArrayD<f64>; I],
    f: impl Fn([f64; I]) -> [f64; O],
) -> Result<[ArrayD<f64>; O], Error> {
    let shape = broadcast_shapes(inputs.iter().map(|a| a.shape()))?;
    let mut args = Vec::with_capacity(I);
    for input in inputs {
        args.push(broadcast_view(input, &shape)?.into_iter());
    }

    let mut out: [ArrayD<f64>; O] = std::array::from_fn(|_| ArrayD::zeros(IxDyn(&shape)));
    let mut slots: Vec<_> = out.iter_mut().map(|o| o.iter_mut()).collect();
    let len: usize = shape.iter().product();
    for _ in 0..len {
        let values: [f64; I] =
            std::array::from_fn(|k| args[k].next().copied().unwrap_or(f64::NAN));
        for (slot, v) in slots.iter_mut().zip(f(values)) {
            if let Some(slot) = slot.next() {
                *slot = v;
            }
        }
    }
    drop(slots);
    Ok(out)
}

/// Checks that `index` can be applied to an array whose leading axes are `shape`.
///
/// `ndarray` panics on out-of-bounds indices; this turns those cases into errors up front.
pub(crate) fn check_index(shape: &[usize], index: &[SliceInfoElem]) -> Result<(), Error> {
    let given = index
        .iter()
        .filter(|e| !matches!(e, SliceInfoElem::NewAxis))
        .count();
    if given > shape.len() {
        return Err(Error::TooManyIndices {
            given,
            ndim: shape.len(),
        });
    }

    let in_bounds = |i: isize, len: usize, inclusive: bool| {
        let len = len as isize;
        if inclusive {
            -len <= i && i <= len
        } else {
            -len <= i && i < len
        }
    };

    let mut axis = 0;
    for elem in index {
        match *elem {
            SliceInfoElem::NewAxis => continue,
            SliceInfoElem::Index(i) => {
                if !in_bounds(i, shape[axis], false) {
                    return Err(Error::IndexOutOfBounds {
                        index: i,
                        axis,
                        len: shape[axis],
                    });
                }
            }
            SliceInfoElem::Slice { start, end, step } => {
                if step == 0 {
                    return Err(Error::ZeroStep { axis });
                }
                for bound in std::iter::once(start).chain(end) {
                    if !in_bounds(bound, shape[axis], true) {
                        return Err(Error::IndexOutOfBounds {
                            index: bound,
                            axis,
                            len: shape[axis],
                        });
                    }
                }
            }
        }
        axis += 1;
    }
    Ok(())
}

/// Renders `values` the way numpy's `array2string` does at precision 3: trailing zeros are
/// trimmed (`1.`, `2.5`), columns are aligned on the decimal point, and nested rows are indented
/// to line up under `prefix`.
///
/// Like numpy, the whole array switches to scientific notation (`1.e-05`) when its largest
/// magnitude is at least `1e8`, its smallest non-zero magnitude is below `1e-4`, or the two are
/// more than three orders of magnitude apart.
pub(crate) fn format_array(values: &ArrayD<f64>, prefix: &str) -> String {
    let padded = if is_scientific(values) {
        pad_scientific(values)
    } else {
        pad_positional(values)
    };
    if values.ndim() == 0 {
        return padded.iter().next().cloned().unwrap_or_default();
    }
    nested(&padded.view(), prefix, 0)
}

fn is_scientific(values: &ArrayD<f64>) -> bool {
    let (min, max) = values
        .iter()
        .map(|v| v.abs())
        .filter(|v| v.is_finite() && *v != 0.)
        .fold((f64::INFINITY, 0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    max >= 1e8 || (max > 0. && (min < 1e-4 || max / min > 1e3))
}

fn pad_positional(values: &ArrayD<f64>) -> ArrayD<String> {
    let formatted = values.map(|&v| format_element(v));
    let (int_width, frac_width) = formatted.iter().fold((0, 0), |(i, f), s| {
        let (int, frac) = split_decimal(s);
        (i.max(int.len()), f.max(frac.len()))
    });
    formatted.map(|s| {
        let (int, frac) = split_decimal(s);
        format!("{int:>int_width$}{frac:<frac_width$}")
    })
}

fn pad_scientific(values: &ArrayD<f64>) -> ArrayD<String> {
    let parts = values.map(|&v| v.is_finite().then(|| scientific_parts(v)));
    let (int_width, frac_width, exp_width) =
        parts
            .iter()
            .flatten()
            .fold((0, 0, 2), |(i, f, e), (mantissa, exp)| {
                let (int, frac) = split_decimal(mantissa);
                let digits = exp.unsigned_abs().to_string().len();
                (i.max(int.len()), f.max(frac.len()), e.max(digits))
            });
    let width = int_width + frac_width + 2 + exp_width;
    Zip::from(&parts).and(values).map_collect(|part, &v| match part {
        Some((mantissa, exp)) => {
            let (int, frac) = split_decimal(mantissa);
            let sign = if *exp < 0 { '-' } else { '+' };
            let digits = exp.unsigned_abs();
            format!("{int:>int_width$}{frac:<frac_width$}e{sign}{digits:0>exp_width$}")
        }
        None => format!("{:>width$}", format_element(v)),
    })
}

/// Splits `v` into a trimmed mantissa (`"1.5"`, `"-2."`) and a decimal exponent.
fn scientific_parts(v: f64) -> (String, i32) {
    let rendered = format!("{v:.3e}");
    // `{:e}` always renders an exponent, so the fallbacks never apply
    let (mantissa, exp) = rendered.split_once('e').unwrap_or((&rendered, "0"));
    (
        mantissa.trim_end_matches('0').to_owned(),
        exp.parse().unwrap_or(0),
    )
}

fn nested(values: &ArrayViewD<'_, String>, prefix: &str, depth: usize) -> String {
    if values.ndim() == 1 {
        let items: Vec<&str> = values.iter().map(String::as_str).collect();
        return format!("[{}]", items.join(" "));
    }
    let separator = format!(
        "{}{prefix}{}",
        "\n".repeat(values.ndim() - 1),
        " ".repeat(depth + 1)
    );
    let rows: Vec<String> = values
        .axis_iter(Axis(0))
        .map(|row| nested(&row, prefix, depth + 1))
        .collect();
    format!("[{}]", rows.join(&separator))
}

fn format_element(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_owned();
    }
    if v.is_infinite() {
        return if v > 0. { "inf" } else { "-inf" }.to_owned();
    }
    let fixed = format!("{v:.3}");
    let trimmed = fixed.trim_end_matches('0');
    trimmed.to_owned()
}

fn split_decimal(s: &str) -> (&str, &str) {
    match s.find('.') {
        Some(at) => s.split_at(at),
        None => (s, ""),
    }
}
