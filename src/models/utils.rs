use candle_core::{Result, Tensor};
use candle_nn::{Init, VarBuilder, VarMap};

//
// Variable seeded with a given value
//
//   VarBuilder only knows about Init distributions, so the variable is created
//   with a placeholder and then overwritten in place. Tensors handed out before
//   or after the overwrite share the same storage.
//
pub(crate) fn variable_from(
    varmap: &mut VarMap,
    vs: &VarBuilder,
    name: &str,
    value: &Tensor,
) -> Result<Tensor> {
    let var = vs.get_with_hints(value.dims(), name, Init::Const(0.0))?;
    let prefix = vs.prefix();
    let path = if prefix.is_empty() {
        name.to_string()
    } else {
        [prefix.as_str(), name].join(".")
    };
    varmap.set_one(path, value)?;
    Ok(var)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};

    #[test]
    fn test_variable_from() {
        let mut varmap = VarMap::new();
        let vs = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let value = Tensor::new(&[[1f32, 2.], [3., 4.]], &Device::Cpu).unwrap();

        let var = variable_from(&mut varmap, &vs.pp("m"), "w", &value).unwrap();
        assert_eq!(var.to_vec2::<f32>().unwrap(), vec![vec![1., 2.], vec![3., 4.]]);
        assert_eq!(varmap.all_vars().len(), 1);
    }
}
