use std::env;

fn main() {
    // CUDAツールキットのパスを環境変数から取得してリンク検索パスに追加
    if let Ok(cuda_path) = env::var("CUDA_PATH") {
        println!("cargo:rustc-link-search=native={}/lib64", cuda_path);
        println!("cargo:rustc-link-search=native={}/lib", cuda_path);
    }

    // 標準的なCUDAパス
    println!("cargo:rustc-link-search=native=/usr/local/cuda/lib64");
    println!("cargo:rustc-link-search=native=/opt/cuda/lib64");

    // CUDA (cuBLAS) バックエンドが有効な場合のリンク設定
    if env::var("WHISPER_CUBLAS").unwrap_or_default() == "1" {
        println!("cargo:rustc-link-lib=cuda");
        println!("cargo:rustc-link-lib=cublas");
        println!("cargo:rustc-env=GGML_USE_CUBLAS=1");
        println!("cargo:warning=WHISPER_CUBLAS is enabled");
    }

    // OpenCL バックエンド
    if env::var("WHISPER_OPENCL").unwrap_or_default() == "1" {
        println!("cargo:rustc-link-lib=OpenCL");
        println!("cargo:rustc-env=GGML_USE_CLBLAST=1");
        println!("cargo:warning=WHISPER_OPENCL is enabled");
    }

    println!("cargo:rerun-if-env-changed=WHISPER_CUBLAS");
    println!("cargo:rerun-if-env-changed=WHISPER_OPENCL");
    println!("cargo:rerun-if-env-changed=CUDA_PATH");
}
