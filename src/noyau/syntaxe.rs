// src/noyau/syntaxe.rs
//
// Analyse syntaxique par niveaux de priorité (du plus lié au moins lié) :
//   1) primaire   : groupe ( ) [+ paramètre], |x|, appel f(a, b), littéral [+ paramètre]
//   2) unaire     : √ préfixe, ! et ° postfixes, signe en position d’opérande
//   3) puissance  : ^ et % (gauche à droite)
//   4) implicite  : * élidé
//   5) produit    : * et / explicites
//   6) somme      : + et - (signe de tête = 0 ± x)
//
// Les niveaux 3 à 6 produisent des chaînes à plat (associativité gauche).
//
// Contrôles statiques : arité des appels, jeton mal placé (opérande manquant,
// séparateur hors appel, parenthèse orpheline, paramètre détaché, jetons en trop),
// profondeur d’imbrication bornée.

use std::collections::VecDeque;

use num_rational::BigRational;

use super::arbre::{Forme, Litteral, Maillon, Noeud, OpBinaire, OpUnaire, Parametre};
use super::erreurs::{Erreur, GenreErreur, Plage};
use super::fonctions::Fonction;
use super::jetons::{FluxJetons, Jeton, Origine, TypeJeton};
use super::lexique::rationnel_litteral;
use super::terme::Symbole;

/// Groupes, appels et opérateurs unaires empilés au plus.
pub const PROFONDEUR_MAX: usize = 100;

struct Analyseur<'a> {
    flux: &'a FluxJetons,
    pos: usize,
    profondeur: usize,
}

impl<'a> Analyseur<'a> {
    fn courant(&self) -> Option<&'a Jeton> {
        self.flux.jetons.get(self.pos)
    }

    fn suivant(&self, k: usize) -> Option<&'a Jeton> {
        self.flux.jetons.get(self.pos + k)
    }

    fn avancer(&mut self) -> Option<&'a Jeton> {
        let j = self.courant();
        self.pos += 1;
        j
    }

    fn placement(&self, j: &Jeton) -> Erreur {
        Erreur::new(
            GenreErreur::Placement {
                contenu: j.valeur.clone(),
            },
            &self.flux.texte,
            vec![j.plage],
        )
    }

    /// Opérande attendu : fautif = jeton courant, ou dernier jeton en fin de flux.
    fn operande_manquant(&self) -> Erreur {
        match self.courant().or_else(|| self.flux.jetons.last()) {
            Some(j) => self.placement(j),
            None => Erreur::new(
                GenreErreur::Placement {
                    contenu: String::new(),
                },
                &self.flux.texte,
                vec![Plage::new(0, 0)],
            ),
        }
    }

    fn operateur_courant(&self, ops: &[char], origine: Origine) -> Option<OpBinaire> {
        let j = self.courant()?;
        if j.genre != TypeJeton::Operateur || j.origine != origine {
            return None;
        }
        let c = j.valeur.chars().next()?;
        if ops.contains(&c) {
            OpBinaire::depuis_caractere(c)
        } else {
            None
        }
    }

    /// Un niveau d’imbrication de plus, ouvert par `j`.
    fn entrer(&mut self, j: &Jeton) -> Result<(), Erreur> {
        self.profondeur += 1;
        if self.profondeur > PROFONDEUR_MAX {
            return Err(Erreur::new(
                GenreErreur::Profondeur {
                    limite: PROFONDEUR_MAX,
                },
                &self.flux.texte,
                vec![j.plage],
            ));
        }
        Ok(())
    }

    fn sortir(&mut self, niveaux: usize) {
        self.profondeur = self.profondeur.saturating_sub(niveaux);
    }

    fn chaine(tete: Noeud, suite: VecDeque<Maillon>) -> Noeud {
        if suite.is_empty() {
            return tete;
        }
        let plage = suite
            .iter()
            .fold(tete.plage(), |p, m| p.union(m.noeud.plage()));
        Noeud::Chaine {
            tete: Box::new(tete),
            suite,
            plage,
        }
    }

    /// Signe préfixe : `0 ± operande`, zéro implicite de plage vide.
    fn signe(&mut self, operande: fn(&mut Self) -> Result<Noeud, Erreur>) -> Result<Noeud, Erreur> {
        let Some(op) = self.operateur_courant(&['+', '-'], Origine::Source) else {
            return operande(self);
        };
        let debut = self.avancer().map(|j| j.plage).unwrap_or_default();
        let droite = operande(self)?;
        let plage = debut.union(droite.plage());
        Ok(Noeud::Binaire {
            op,
            forme: Forme::Signe,
            gauche: Box::new(Noeud::zero(Plage::new(debut.debut, debut.debut))),
            droite: Box::new(droite),
            plage,
        })
    }

    /* --- 6) somme --- */

    fn somme(&mut self) -> Result<Noeud, Erreur> {
        let tete = self.signe(Self::produit)?;
        let mut suite = VecDeque::new();
        while let Some(op) = self.operateur_courant(&['+', '-'], Origine::Source) {
            self.avancer();
            let noeud = self.produit()?;
            suite.push_back(Maillon {
                op,
                forme: Forme::Explicite,
                noeud,
            });
        }
        Ok(Self::chaine(tete, suite))
    }

    /* --- 5) produit explicite --- */

    fn produit(&mut self) -> Result<Noeud, Erreur> {
        let tete = self.implicite()?;
        let mut suite = VecDeque::new();
        while let Some(op) = self.operateur_courant(&['*', '/'], Origine::Source) {
            self.avancer();
            let noeud = self.implicite()?;
            suite.push_back(Maillon {
                op,
                forme: Forme::Explicite,
                noeud,
            });
        }
        Ok(Self::chaine(tete, suite))
    }

    /* --- 4) produit implicite --- */

    fn implicite(&mut self) -> Result<Noeud, Erreur> {
        let tete = self.puissance()?;
        let mut suite = VecDeque::new();
        while self
            .operateur_courant(&['*'], Origine::MultiplicationImplicite)
            .is_some()
        {
            self.avancer();
            let noeud = self.puissance()?;
            suite.push_back(Maillon {
                op: OpBinaire::Fois,
                forme: Forme::Juxtaposition,
                noeud,
            });
        }
        Ok(Self::chaine(tete, suite))
    }

    /* --- 3) puissance / modulo --- */

    fn puissance(&mut self) -> Result<Noeud, Erreur> {
        let tete = self.unaire()?;
        let mut suite = VecDeque::new();
        while let Some(op) = self.operateur_courant(&['^', '%'], Origine::Source) {
            self.avancer();
            let noeud = self.unaire()?;
            suite.push_back(Maillon {
                op,
                forme: Forme::Explicite,
                noeud,
            });
        }
        Ok(Self::chaine(tete, suite))
    }

    /* --- 2) unaire --- */

    fn unaire(&mut self) -> Result<Noeud, Erreur> {
        // signe en position d’opérande : `2^-1`, `2*-3`
        if self.operateur_courant(&['+', '-'], Origine::Source).is_some() {
            if let Some(j) = self.courant() {
                self.entrer(j)?;
            }
            let noeud = self.signe(Self::puissance)?;
            self.sortir(1);
            return Ok(noeud);
        }
        if let Some(j) = self.courant().filter(|j| j.est_operateur('√')) {
            self.entrer(j)?;
            self.avancer();
            let operande = self.unaire()?;
            self.sortir(1);
            let plage = j.plage.union(operande.plage());
            return Ok(Noeud::Unaire {
                op: OpUnaire::Racine,
                operande: Box::new(operande),
                plage,
            });
        }

        let mut noeud = self.primaire()?;
        let mut postfixes = 0;
        while let Some(j) = self
            .courant()
            .filter(|j| j.est_operateur('!') || j.est_operateur('°'))
        {
            self.entrer(j)?;
            postfixes += 1;
            self.avancer();
            let op = if j.est_operateur('!') {
                OpUnaire::Factorielle
            } else {
                OpUnaire::Degre
            };
            let plage = noeud.plage().union(j.plage);
            noeud = Noeud::Unaire {
                op,
                operande: Box::new(noeud),
                plage,
            };
        }
        self.sortir(postfixes);
        Ok(noeud)
    }

    /* --- 1) primaire --- */

    fn parametre(&mut self) -> Option<Parametre> {
        let j = self
            .courant()
            .filter(|j| j.genre == TypeJeton::ParametreIrrationnel)?;
        self.avancer();
        Parametre::depuis_jeton(j)
    }

    fn fermer(&mut self, ouvrante: &Jeton) -> Result<&'a Jeton, Erreur> {
        match self.courant() {
            Some(j) if j.genre == TypeJeton::ParentheseDroite => {
                self.avancer();
                Ok(j)
            }
            Some(j) => Err(self.placement(j)),
            None => Err(self.placement(ouvrante)),
        }
    }

    fn primaire(&mut self) -> Result<Noeud, Erreur> {
        let Some(j) = self.courant() else {
            return Err(self.operande_manquant());
        };

        match j.genre {
            _ if j.est_nombre() => self.nombre(j),

            TypeJeton::IrrationnelNatif | TypeJeton::IrrationnelCourt | TypeJeton::IrrationnelLong => {
                self.avancer();
                let symbole = Symbole::depuis_texte(&j.valeur).ok_or_else(|| self.placement(j))?;
                let parametre = self.parametre();
                let plage = parametre.as_ref().map_or(j.plage, |p| j.plage.union(p.plage));
                Ok(Noeud::Litteral {
                    litteral: Litteral::Irrationnel { symbole, parametre },
                    plage,
                })
            }

            TypeJeton::ParentheseGauche => {
                self.entrer(j)?;
                self.avancer();
                if let Some(f) = self.courant().filter(|f| f.genre == TypeJeton::ParentheseDroite) {
                    return Err(self.placement(f));
                }
                let contenu = self.somme()?;
                let fin = self.fermer(j)?;
                self.sortir(1);
                let parametre = self.parametre();
                let plage = j
                    .plage
                    .union(parametre.as_ref().map_or(fin.plage, |p| p.plage));
                Ok(Noeud::Groupe {
                    contenu: Box::new(contenu),
                    parametre,
                    plage,
                })
            }

            TypeJeton::Operateur if j.est_operateur('|') => {
                self.entrer(j)?;
                self.avancer();
                let contenu = self.somme()?;
                match self.courant() {
                    Some(f) if f.est_operateur('|') => {
                        self.avancer();
                        self.sortir(1);
                        Ok(Noeud::Unaire {
                            op: OpUnaire::Absolu,
                            operande: Box::new(contenu),
                            plage: j.plage.union(f.plage),
                        })
                    }
                    Some(f) => Err(self.placement(f)),
                    None => Err(self.placement(j)),
                }
            }

            TypeJeton::Fonction => self.appel(j),

            _ => Err(self.placement(j)),
        }
    }

    /// Entier, éventuellement suivi d’une barre de fraction et d’un entier (un seul littéral).
    fn nombre(&mut self, j: &'a Jeton) -> Result<Noeud, Erreur> {
        self.avancer();
        let valeur = rationnel_litteral(j).ok_or_else(|| self.placement(j))?;

        let barre = self
            .courant()
            .is_some_and(|b| b.est_operateur('/') && b.origine == Origine::BarreFraction);
        if let (true, Some(d)) = (barre, self.suivant(1)) {
            if d.genre == TypeJeton::Entier {
                self.pos += 2;
                let denom = rationnel_litteral(d).ok_or_else(|| self.placement(d))?;
                let r: BigRational = valeur / denom;
                return Ok(Noeud::Litteral {
                    litteral: Litteral::Fraction(r),
                    plage: j.plage.union(d.plage),
                });
            }
        }
        Ok(Noeud::Litteral {
            litteral: Litteral::Fraction(valeur),
            plage: j.plage,
        })
    }

    fn appel(&mut self, j: &'a Jeton) -> Result<Noeud, Erreur> {
        self.entrer(j)?;
        self.avancer();
        let fonction = Fonction::depuis_nom(&j.valeur).ok_or_else(|| self.placement(j))?;

        let ouvrante = match self.courant() {
            Some(o) if o.genre == TypeJeton::ParentheseGauche => o,
            Some(o) => return Err(self.placement(o)),
            None => return Err(self.placement(j)),
        };
        self.avancer();

        let mut args = Vec::new();
        if !self
            .courant()
            .is_some_and(|f| f.genre == TypeJeton::ParentheseDroite)
        {
            loop {
                args.push(self.somme()?);
                match self.courant() {
                    Some(s) if s.genre == TypeJeton::Separateur => {
                        self.avancer();
                    }
                    _ => break,
                }
            }
        }
        let fin = self.fermer(ouvrante)?;
        self.sortir(1);
        let plage = j.plage.union(fin.plage);

        if args.len() != fonction.arite() {
            return Err(Erreur::new(
                GenreErreur::Arite {
                    fonction: fonction.nom().to_string(),
                    attendu: fonction.arite(),
                    recu: args.len(),
                },
                &self.flux.texte,
                vec![plage],
            ));
        }
        Ok(Noeud::Appel {
            fonction,
            args,
            plage,
        })
    }
}

/// Flux vérifié -> arbre sémantique.
pub fn parse(flux: &FluxJetons) -> Result<Noeud, Erreur> {
    let mut a = Analyseur {
        flux,
        pos: 0,
        profondeur: 0,
    };
    if flux.is_empty() {
        return Err(a.operande_manquant());
    }
    let racine = a.somme()?;
    if let Some(j) = a.courant() {
        return Err(a.placement(j));
    }
    Ok(racine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::config::Tables;
    use crate::noyau::lexique::tokenize;
    use pretty_assertions::assert_eq;

    fn arbre(s: &str) -> String {
        let flux = tokenize(s, &Tables::default()).unwrap();
        parse(&flux).unwrap().to_string()
    }

    fn err(s: &str) -> Erreur {
        let flux = tokenize(s, &Tables::default()).unwrap();
        parse(&flux).unwrap_err()
    }

    #[test]
    fn priorites() {
        assert_eq!(arbre("1+2*3"), "(+ 1 (* 2 3))");
        assert_eq!(arbre("2^3^2"), "(^ (^ 2 3) 2)");
        assert_eq!(arbre("1-2-3"), "(- (- 1 2) 3)");
        assert_eq!(arbre("√4!"), "(√ (! 4))");
        assert_eq!(arbre("2*3°"), "(* 2 (° 3))");
    }

    #[test]
    fn multiplication_implicite_plus_liee() {
        assert_eq!(arbre("3x/6xy"), "(/ (· 3 x) (· (· 6 x) y))");
        assert_eq!(arbre("2x^2"), "(· 2 (^ x 2))");
    }

    #[test]
    fn signes() {
        assert_eq!(arbre("-1/2+1/3"), "(+ (neg (/ 1 2)) (/ 1 3))");
        assert_eq!(arbre("2^-1"), "(^ 2 (neg 1))");
        assert_eq!(arbre("2*-3"), "(* 2 (neg 3))");
        assert_eq!(arbre("-2^2"), "(neg (^ 2 2))");
    }

    #[test]
    fn litteraux_fractionnes() {
        // `2.5` devient un seul littéral 5/2 ; `5/2` écrit reste une division
        assert_eq!(arbre("2.5"), "5/2");
        assert_eq!(arbre("5/2"), "(/ 5 2)");
        assert_eq!(arbre("50%"), "1/2");
        // `%` suivi d’une valeur : modulo
        assert_eq!(arbre("50%x"), "(% 50 x)");
    }

    #[test]
    fn groupes_appels_et_parametres() {
        assert_eq!(arbre("(1+2)3?"), "(groupe (+ 1 2) 3?)");
        assert_eq!(arbre("pow(2,3)"), "(pow 2 3)");
        assert_eq!(arbre("x2.5?+π4?"), "(+ x2.5? π4?)");
        assert_eq!(arbre("|-2|"), "(abs (neg 2))");
        assert_eq!(arbre("2|x|"), "(· 2 (abs x))");
    }

    #[test]
    fn erreurs_d_arite() {
        let e = err("pow(2)");
        assert!(matches!(
            e.genre,
            GenreErreur::Arite {
                attendu: 2,
                recu: 1,
                ..
            }
        ));
        assert_eq!(e.plages, vec![Plage::new(0, 6)]);
        assert!(matches!(err("sin()").genre, GenreErreur::Arite { recu: 0, .. }));
    }

    #[test]
    fn erreurs_de_placement() {
        let e = err("1+");
        assert!(matches!(e.genre, GenreErreur::Placement { .. }));
        assert_eq!(e.plages, vec![Plage::new(1, 2)]);

        let e = err("1,2");
        assert!(matches!(e.genre, GenreErreur::Placement { .. }));
        assert_eq!(e.plages, vec![Plage::new(1, 2)]);

        let e = err("()");
        assert_eq!(e.plages, vec![Plage::new(1, 2)]);

        let e = err("?");
        assert_eq!(e.extrait().as_deref(), Some("?"));

        let e = err("*2");
        assert_eq!(e.plages, vec![Plage::new(0, 1)]);
    }

    #[test]
    fn longues_sommes_a_plat() {
        let expr = vec!["1"; 3000].join("+");
        let flux = tokenize(&expr, &Tables::default()).unwrap();
        match parse(&flux).unwrap() {
            Noeud::Chaine { tete, suite, plage } => {
                assert!(matches!(*tete, Noeud::Litteral { .. }));
                assert_eq!(suite.len(), 2999);
                assert!(suite.iter().all(|m| matches!(m.noeud, Noeud::Litteral { .. })));
                assert_eq!(plage, Plage::new(0, expr.chars().count()));
            }
            autre => panic!("chaîne attendue : {autre}"),
        }
    }

    #[test]
    fn imbrication_bornee() {
        let profond = format!("{}1{}", "(".repeat(3000), ")".repeat(3000));
        let e = err(&profond);
        assert!(matches!(
            e.genre,
            GenreErreur::Profondeur {
                limite: PROFONDEUR_MAX
            }
        ));
        // l’erreur porte sur la parenthèse qui dépasse la limite
        assert_eq!(e.plages, vec![Plage::new(PROFONDEUR_MAX, PROFONDEUR_MAX + 1)]);

        let e = err(&format!("{}4", "√".repeat(500)));
        assert!(matches!(e.genre, GenreErreur::Profondeur { .. }));
        let e = err(&format!("3{}", "!".repeat(500)));
        assert!(matches!(e.genre, GenreErreur::Profondeur { .. }));

        // juste sous la limite : accepté
        let limite = format!(
            "{}1{}",
            "(".repeat(PROFONDEUR_MAX),
            ")".repeat(PROFONDEUR_MAX)
        );
        assert_eq!(arbre(&limite), format!("{}1{}", "(groupe ".repeat(PROFONDEUR_MAX), ")".repeat(PROFONDEUR_MAX)));
    }
}
