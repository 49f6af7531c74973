use lockstep_math::Fix64;

fn main() {
    let vals: Vec<f64> = vec![
        0.0, 1.0, -1.0, 0.5, -0.5, 0.25, -0.25, 0.75, -0.75, 1.25, -1.25, 32767.0, -32768.0,
    ];

    // raw encodings plus a transcendental pass, all hashed as raw bits.
    // two builds on any platforms must print the same digest.
    let mut raws: Vec<i64> = vals.iter().map(|&v| Fix64::from_f64(v).raw()).collect();
    for &v in &vals {
        let x = Fix64::from_f64(v);
        raws.push(x.sin().raw());
        raws.push(x.cos().raw());
        raws.push(x.atan().raw());
        raws.push(x.pow2().raw());
    }

    let mut bytes = Vec::with_capacity(raws.len() * 8);
    for v in &raws { bytes.extend_from_slice(&v.to_le_bytes()); }
    let digest = sha256(&bytes);
    println!("Q3132_HASH {}", digest);
}

fn sha256(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    let out = hasher.finalize();
    hex::encode(out)
}
