use anyhow::{ensure, Result};
use burn::{
    module::Param,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{gelu, relu, sigmoid, softmax},
};

// Defaults reproduce the vit_tiny trunk the weights were trained
// with, re-shaped for a 14×7 single-channel input and (2,1) patches.
// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct IrrigationVitConfig {
    #[config(default = 1)]
    pub in_channels:    usize,
    #[config(default = "[14, 7]")]
    pub img_size:       [usize; 2],
    #[config(default = "[2, 1]")]
    pub patch_size:     [usize; 2],
    #[config(default = 192)]
    pub embed_dim:      usize,
    #[config(default = 12)]
    pub depth:          usize,
    #[config(default = 3)]
    pub num_heads:      usize,
    #[config(default = 768)]
    pub mlp_hidden:     usize,
    #[config(default = 1e-6)]
    pub layer_norm_eps: f64,
    #[config(default = 14)]
    pub out_features:   usize,
}

impl IrrigationVitConfig {
    /// Reject hyperparameters no weights file could ever match.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.depth > 0, "depth must be at least 1");
        ensure!(self.num_heads > 0, "num_heads must be at least 1");
        ensure!(
            self.embed_dim % self.num_heads == 0,
            "embed_dim {} is not divisible by num_heads {}",
            self.embed_dim, self.num_heads
        );
        for axis in 0..2 {
            ensure!(
                self.patch_size[axis] > 0 && self.img_size[axis] % self.patch_size[axis] == 0,
                "img_size {:?} is not divisible by patch_size {:?}",
                self.img_size, self.patch_size
            );
        }
        Ok(())
    }

    /// (14 / 2) * (7 / 1) = 49 for the defaults.
    pub fn num_patches(&self) -> usize {
        (self.img_size[0] / self.patch_size[0]) * (self.img_size[1] / self.patch_size[1])
    }

    /// Freshly initialised model; weights are loaded on top of it.
    pub fn init<B: Backend>(&self, device: &B::Device) -> IrrigationVit<B> {
        let patch_embed = PatchEmbed {
            proj: Conv2dConfig::new([self.in_channels, self.embed_dim], self.patch_size)
                .with_stride(self.patch_size)
                .init(device),
        };
        let cls_token = Param::from_tensor(Tensor::zeros([1, 1, self.embed_dim], device));
        let pos_embed = Param::from_tensor(Tensor::zeros(
            [1, self.num_patches() + 1, self.embed_dim],
            device,
        ));
        let blocks: Vec<Block<B>> = (0..self.depth)
            .map(|_| self.build_block(device))
            .collect();
        let norm = self.layer_norm(device);
        let head = IrrigationHead {
            schedule_predictor: LinearConfig::new(self.embed_dim, self.out_features).init(device),
            quantity_predictor: LinearConfig::new(self.embed_dim, self.out_features).init(device),
        };
        IrrigationVit { patch_embed, cls_token, pos_embed, blocks, norm, head }
    }

    fn build_block<B: Backend>(&self, device: &B::Device) -> Block<B> {
        let attn = Attention {
            qkv:       LinearConfig::new(self.embed_dim, self.embed_dim * 3).init(device),
            proj:      LinearConfig::new(self.embed_dim, self.embed_dim).init(device),
            num_heads: self.num_heads,
        };
        let mlp = Mlp {
            fc1: LinearConfig::new(self.embed_dim, self.mlp_hidden).init(device),
            fc2: LinearConfig::new(self.mlp_hidden, self.embed_dim).init(device),
        };
        Block {
            norm1: self.layer_norm(device),
            attn,
            norm2: self.layer_norm(device),
            mlp,
        }
    }

    fn layer_norm<B: Backend>(&self, device: &B::Device) -> LayerNorm<B> {
        LayerNormConfig::new(self.embed_dim)
            .with_epsilon(self.layer_norm_eps)
            .init(device)
    }
}

// Field names mirror the state-dict keys of the trained weights
// (patch_embed.proj, blocks.N.attn.qkv, head.schedule_predictor, ...)
// so they load without any key remapping.

#[derive(Module, Debug)]
pub struct PatchEmbed<B: Backend> {
    pub proj: Conv2d<B>,
}

impl<B: Backend> PatchEmbed<B> {
    /// [batch, channels, h, w] → [batch, num_patches, embed_dim]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 3> {
        self.proj.forward(x).flatten::<3>(2, 3).swap_dims(1, 2)
    }
}

#[derive(Module, Debug)]
pub struct Attention<B: Backend> {
    pub qkv:       Linear<B>,
    pub proj:      Linear<B>,
    pub num_heads: usize,
}

impl<B: Backend> Attention<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, tokens, dim] = x.dims();
        let heads    = self.num_heads;
        let head_dim = dim / heads;

        // [batch, tokens, 3 * dim] → [batch, tokens, 3, heads, head_dim]
        let qkv = self.qkv.forward(x).reshape([batch, tokens, 3, heads, head_dim]);
        let pick = |i: usize| {
            qkv.clone()
                .slice([0..batch, 0..tokens, i..i + 1, 0..heads, 0..head_dim])
                .reshape([batch, tokens, heads, head_dim])
                .swap_dims(1, 2)
        };
        let (q, k, v) = (pick(0), pick(1), pick(2));

        let scale  = (head_dim as f64).powf(-0.5);
        let scores = q.matmul(k.swap_dims(2, 3)) * scale;
        let attn   = softmax(scores, 3);

        let out = attn.matmul(v).swap_dims(1, 2).reshape([batch, tokens, dim]);
        self.proj.forward(out)
    }
}

#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    pub fc1: Linear<B>,
    pub fc2: Linear<B>,
}

impl<B: Backend> Mlp<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        self.fc2.forward(gelu(self.fc1.forward(x)))
    }
}

/// Pre-norm transformer encoder block.
#[derive(Module, Debug)]
pub struct Block<B: Backend> {
    pub norm1: LayerNorm<B>,
    pub attn:  Attention<B>,
    pub norm2: LayerNorm<B>,
    pub mlp:   Mlp<B>,
}

impl<B: Backend> Block<B> {
    /// Pre-norm residual block: attention, then MLP.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let x = x.clone() + self.attn.forward(self.norm1.forward(x));
        x.clone() + self.mlp.forward(self.norm2.forward(x))
    }
}

/// Two independent projections from the CLS embedding.
#[derive(Module, Debug)]
pub struct IrrigationHead<B: Backend> {
    pub schedule_predictor: Linear<B>,
    pub quantity_predictor: Linear<B>,
}

impl<B: Backend> IrrigationHead<B> {
    /// embedding: [batch, embed_dim] → (sigmoid, relu) each [batch, out_features]
    pub fn forward(&self, embedding: Tensor<B, 2>) -> IrrigationOutput<B> {
        IrrigationOutput {
            schedule: sigmoid(self.schedule_predictor.forward(embedding.clone())),
            quantity: relu(self.quantity_predictor.forward(embedding)),
        }
    }
}

#[derive(Module, Debug)]
pub struct IrrigationVit<B: Backend> {
    pub patch_embed: PatchEmbed<B>,
    pub cls_token:   Param<Tensor<B, 3>>,
    pub pos_embed:   Param<Tensor<B, 3>>,
    pub blocks:      Vec<Block<B>>,
    pub norm:        LayerNorm<B>,
    pub head:        IrrigationHead<B>,
}

pub struct IrrigationOutput<B: Backend> {
    /// Per-slot irrigation probability in (0, 1).
    pub schedule: Tensor<B, 2>,
    /// Per-slot irrigation amount, ≥ 0.
    pub quantity: Tensor<B, 2>,
}

impl<B: Backend> IrrigationVit<B> {
    /// CLS embedding after the final norm: [batch, 1, 14, 7] → [batch, embed_dim]
    pub fn embed(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let patches = self.patch_embed.forward(images);
        let [batch, _, dim] = patches.dims();

        let cls = Tensor::cat(vec![self.cls_token.val(); batch], 0);
        let mut x = Tensor::cat(vec![cls, patches], 1) + self.pos_embed.val();
        for block in &self.blocks {
            x = block.forward(x);
        }
        let x = self.norm.forward(x);

        x.slice([0..batch, 0..1, 0..dim]).reshape([batch, dim])
    }

    /// images: [batch, 1, 14, 7] → schedule, quantity: [batch, 14]
    pub fn forward(&self, images: Tensor<B, 4>) -> IrrigationOutput<B> {
        self.head.forward(self.embed(images))
    }
}
